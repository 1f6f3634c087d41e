//! Trial Coordinator
//!
//! The simulation entry point. Validates the request, builds the shared
//! read-only state (score distributions, ownership, opponent field,
//! payout schedule, correlation matrix), then fans trial indices out to a
//! pool of worker threads and folds their results into per-lineup
//! aggregates.
//!
//! Workers pull trial indices from an atomic cursor until it drains, a
//! cancellation signal fires, or the per-trial failure count crosses the
//! configured threshold. Trial RNG streams are keyed by trial index, so
//! a given seed produces bit-identical results at any worker count.

use crate::analytics::metrics::{LineupResult, ResultAggregator};
use crate::error::SimulationError;
use crate::math::correlation::{CorrelationEntry, CorrelationMatrix, ScoreBounds};
use crate::math::seeding;
use crate::models::contest::{Contest, PayoutSchedule};
use crate::models::lineup::{Lineup, LineupKind};
use crate::models::player::{IdentityAdjuster, Player, ScoreDistribution, SportAdjuster};
use crate::simulators::field::build_field;
use crate::simulators::ownership::generate_ownership;
use crate::simulators::progress::{spawn_reporter, ProgressSnapshot};
use crate::simulators::trial::{run_trial, TrialContext};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn default_failure_threshold() -> f64 {
    0.01
}

/// Tunable simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of Monte Carlo trials
    pub trials: usize,
    /// Worker thread count; defaults to available parallelism
    #[serde(default)]
    pub workers: Option<usize>,
    /// Whether to apply the correlation perturbation
    #[serde(default)]
    pub use_correlations: bool,
    /// Pairwise correlation coefficients
    #[serde(default)]
    pub correlations: Vec<CorrelationEntry>,
    /// Caller-supplied payout schedule; defaults derive from the contest
    #[serde(default)]
    pub payout_schedule: Option<PayoutSchedule>,
    /// Master seed; defaults to wall-clock entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Run aborts when more than this fraction of trials fault
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: f64,
    /// Wall-clock budget; crossing it cancels the run
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            trials: 10_000,
            workers: None,
            use_correlations: false,
            correlations: Vec::new(),
            payout_schedule: None,
            seed: None,
            failure_threshold: default_failure_threshold(),
            timeout_ms: None,
        }
    }
}

/// A complete simulation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub params: SimulationParams,
    /// The player pool
    pub players: Vec<Player>,
    /// User lineups as lists of player ids resolving into the pool
    pub lineups: Vec<Vec<String>>,
    pub contest: Contest,
}

/// Aggregated output of a run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    /// One aggregated result per user lineup, in request order
    pub lineup_results: Vec<LineupResult>,
    /// Whether the run was cancelled (externally or by timeout)
    pub cancelled: bool,
    pub trials_completed: usize,
    pub trials_failed: usize,
    /// Opponent rosters actually constructed
    pub field_size: usize,
}

/// Cancellation signal shared between the caller and the workers
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Run a simulation with default cancellation and no progress stream
pub fn run_simulation(request: &SimulationRequest) -> Result<SimulationOutcome, SimulationError> {
    run_simulation_with(request, CancelToken::new(), None, None)
}

/// Run a simulation with an external cancel token, an optional progress
/// sink, and an optional sport adjustment hook
///
/// Blocks until the run completes, is cancelled, or fails. Progress
/// snapshots are emitted roughly every 100 ms; a full sink drops
/// snapshots rather than stalling the run.
pub fn run_simulation_with(
    request: &SimulationRequest,
    cancel: CancelToken,
    progress_sink: Option<SyncSender<ProgressSnapshot>>,
    adjuster: Option<Arc<dyn SportAdjuster>>,
) -> Result<SimulationOutcome, SimulationError> {
    validate(request)?;

    let params = &request.params;
    let contest = &request.contest;
    let trials = params.trials;
    let master_seed = params.seed.unwrap_or_else(seeding::entropy_seed);

    // Shared read-only setup, all derived before any trial runs
    let distributions: HashMap<String, ScoreDistribution> = request
        .players
        .iter()
        .map(|p| (p.id.clone(), ScoreDistribution::for_player(p)))
        .collect();
    let bounds: HashMap<String, ScoreBounds> = request
        .players
        .iter()
        .map(|p| {
            (
                p.id.clone(),
                ScoreBounds::new(p.projected_points, p.ceiling),
            )
        })
        .collect();

    let by_id: HashMap<&str, &Player> = request
        .players
        .iter()
        .map(|p| (p.id.as_str(), p))
        .collect();
    let user_lineups: Vec<Lineup> = request
        .lineups
        .iter()
        .map(|ids| {
            let players = ids.iter().map(|id| by_id[id.as_str()].clone()).collect();
            Lineup::new(players, LineupKind::User)
        })
        .collect();
    let user_count = user_lineups.len();

    let field_target = contest.total_entries.saturating_sub(user_count);
    let field = if field_target > 0 {
        let mut ownership_rng = seeding::ownership_rng(master_seed);
        let ownership =
            generate_ownership(&request.players, contest.contest_type, &mut ownership_rng);
        build_field(
            &request.players,
            &ownership,
            contest,
            field_target,
            master_seed,
        )
    } else {
        Vec::new()
    };
    let field_size = field.len();

    let mut rosters = user_lineups;
    rosters.extend(field);

    let schedule = params
        .payout_schedule
        .clone()
        .unwrap_or_else(|| PayoutSchedule::default_for(contest));

    let matrix = if params.use_correlations && !params.correlations.is_empty() {
        Some(CorrelationMatrix::from_entries(&params.correlations))
    } else {
        None
    };

    let adjuster = adjuster.unwrap_or_else(|| Arc::new(IdentityAdjuster));
    let ctx = TrialContext {
        pool: &request.players,
        distributions: &distributions,
        bounds: &bounds,
        rosters: &rosters,
        user_count,
        schedule: &schedule,
        matrix: matrix.as_ref(),
        adjuster: adjuster.as_ref(),
    };

    let workers = params
        .workers
        .filter(|&w| w > 0)
        .unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });
    info!(
        "simulating {} trials across {} workers ({} user lineups, field of {})",
        trials, workers, user_count, field_size
    );

    let cursor = AtomicUsize::new(0);
    let completed = Arc::new(AtomicUsize::new(0));
    let failed = AtomicUsize::new(0);
    // Failure budget: strictly more than threshold * trials aborts
    let max_failures = (params.failure_threshold * trials as f64) as usize;
    let deadline = params
        .timeout_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));

    let reporter_stop = Arc::new(AtomicBool::new(false));
    let reporter = progress_sink.map(|sink| {
        spawn_reporter(
            trials,
            Arc::clone(&completed),
            Arc::clone(&reporter_stop),
            sink,
        )
    });

    let mut aggregator = ResultAggregator::new(user_count);

    let spawn_result = thread::scope(|scope| -> Result<(), SimulationError> {
        let (tx, rx) = mpsc::sync_channel(trials);

        for worker in 0..workers {
            let tx = tx.clone();
            let ctx = &ctx;
            let cursor = &cursor;
            let completed = &completed;
            let failed = &failed;
            let cancel = &cancel;

            let handle = thread::Builder::new()
                .name(format!("trial-worker-{}", worker))
                .spawn_scoped(scope, move || loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            cancel.cancel();
                            break;
                        }
                    }
                    if failed.load(Ordering::Relaxed) > max_failures {
                        break;
                    }
                    let trial = cursor.fetch_add(1, Ordering::Relaxed);
                    if trial >= trials {
                        break;
                    }

                    match panic::catch_unwind(AssertUnwindSafe(|| {
                        run_trial(ctx, trial, master_seed)
                    })) {
                        Ok(outcome) => {
                            completed.fetch_add(1, Ordering::Relaxed);
                            if tx.send(outcome).is_err() {
                                break;
                            }
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            debug!("trial {} faulted; result dropped", trial);
                        }
                    }
                });

            if let Err(err) = handle {
                // Already-spawned workers observe the cancel flag and exit
                cancel.cancel();
                return Err(SimulationError::WorkerSpawn(err));
            }
        }
        drop(tx);

        for outcome in rx {
            aggregator.record(&outcome);
        }
        Ok(())
    });

    reporter_stop.store(true, Ordering::Relaxed);
    if let Some(handle) = reporter {
        let _ = handle.join();
    }
    spawn_result?;

    let trials_completed = completed.load(Ordering::Relaxed);
    let trials_failed = failed.load(Ordering::Relaxed);
    if trials_failed > max_failures {
        return Err(SimulationError::FatalFailureRate {
            failed: trials_failed,
            attempted: trials_completed + trials_failed,
        });
    }

    let entrants = rosters.len();
    let outcome = SimulationOutcome {
        lineup_results: aggregator.finalize(contest, entrants),
        cancelled: cancel.is_cancelled(),
        trials_completed,
        trials_failed,
        field_size,
    };
    info!(
        "run finished: {} trials completed, {} failed, cancelled={}",
        outcome.trials_completed, outcome.trials_failed, outcome.cancelled
    );
    Ok(outcome)
}

/// Reject invalid input before any trial runs
fn validate(request: &SimulationRequest) -> Result<(), SimulationError> {
    if request.params.trials == 0 {
        return Err(SimulationError::InvalidTrialCount);
    }
    if request.contest.total_entries == 0 {
        return Err(SimulationError::InvalidContestSize);
    }
    if request.contest.salary_cap == 0 {
        return Err(SimulationError::InvalidSalaryCap);
    }
    if request.contest.roster_size() == 0 {
        return Err(SimulationError::EmptyRosterRequirements);
    }
    if request.players.is_empty() {
        return Err(SimulationError::EmptyPlayerPool);
    }
    if request.lineups.is_empty() {
        return Err(SimulationError::NoLineups);
    }

    let ids: std::collections::HashSet<&str> =
        request.players.iter().map(|p| p.id.as_str()).collect();
    let required = request.contest.roster_size();
    for (index, lineup) in request.lineups.iter().enumerate() {
        if lineup.len() != required {
            return Err(SimulationError::RosterSizeMismatch {
                lineup: index,
                required,
                actual: lineup.len(),
            });
        }
        for id in lineup {
            if !ids.contains(id.as_str()) {
                return Err(SimulationError::UnknownPlayer {
                    lineup: index,
                    player_id: id.clone(),
                });
            }
        }
    }
    Ok(())
}
