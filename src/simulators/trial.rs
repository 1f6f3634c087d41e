//! Trial Worker
//!
//! Executes one Monte Carlo trial: draw a score for every pool player
//! (optionally perturbed by the correlation matrix), total each roster,
//! rank all rosters on the identical score map, and assign payouts. User
//! lineups occupy the head of the roster list at stable indices, so the
//! aggregator can fold results per user lineup across trials.

use crate::math::correlation::{CorrelationMatrix, ScoreBounds};
use crate::math::seeding;
use crate::models::contest::PayoutSchedule;
use crate::models::lineup::Lineup;
use crate::models::player::{Player, ScoreDistribution, SportAdjuster};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Shared read-only state for trial execution
///
/// Built once by the coordinator; no mutation during a run, so workers
/// share it by reference without locking.
pub struct TrialContext<'a> {
    pub pool: &'a [Player],
    pub distributions: &'a HashMap<String, ScoreDistribution>,
    /// Correlation clamp data, keyed by player id
    pub bounds: &'a HashMap<String, ScoreBounds>,
    /// User lineups first, then the synthesized field
    pub rosters: &'a [Lineup],
    /// Number of user lineups at the head of `rosters`
    pub user_count: usize,
    pub schedule: &'a PayoutSchedule,
    pub matrix: Option<&'a CorrelationMatrix>,
    pub adjuster: &'a dyn SportAdjuster,
}

/// Per-trial result for one user lineup
#[derive(Debug, Clone)]
pub struct LineupTrialResult {
    /// Index of the user lineup in the request
    pub lineup_index: usize,
    /// Total roster score this trial
    pub score: f64,
    /// Rank among all rosters, 1 = best
    pub rank: usize,
    /// Rank as a percentile of the roster count, in [0, 100]
    pub percentile: f64,
    /// Prize for the rank; a zero-point roster never cashes
    pub payout: f64,
}

/// Output of one trial: one entry per user lineup
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub trial: usize,
    pub results: Vec<LineupTrialResult>,
}

/// Run a single trial
///
/// Deterministic given the master seed and trial index: the RNG stream
/// is keyed by trial index, never by worker identity.
pub fn run_trial(ctx: &TrialContext<'_>, trial: usize, master_seed: u64) -> TrialOutcome {
    let mut rng = seeding::trial_rng(master_seed, trial);

    // Independent base draws for the whole pool, in pool order
    let mut scores: HashMap<String, f64> = ctx
        .pool
        .iter()
        .map(|player| {
            let base = ctx.distributions[&player.id].sample(&mut rng);
            let adjusted = ctx.adjuster.adjust(player, base).max(0.0);
            (player.id.clone(), adjusted)
        })
        .collect();

    if let Some(matrix) = ctx.matrix {
        scores = matrix.perturb(&scores, ctx.bounds);
    }

    // Every roster totals against the identical score map
    let totals: Vec<f64> = ctx
        .rosters
        .iter()
        .map(|lineup| {
            lineup
                .players
                .iter()
                .map(|p| scores.get(&p.id).copied().unwrap_or(0.0))
                .sum()
        })
        .collect();

    let rank_of = rank_descending(&totals);
    let entrants = ctx.rosters.len();

    let results = (0..ctx.user_count)
        .map(|index| {
            let rank = rank_of[index];
            let score = totals[index];
            let payout = if score > 0.0 {
                ctx.schedule.payout_for_rank(rank)
            } else {
                0.0
            };
            LineupTrialResult {
                lineup_index: index,
                score,
                rank,
                percentile: rank as f64 / entrants as f64 * 100.0,
                payout,
            }
        })
        .collect();

    TrialOutcome { trial, results }
}

/// Assign ranks 1..=n by descending score
///
/// Ties break by stable input order: among equal scores, the earlier
/// roster gets the better rank.
pub fn rank_descending(totals: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|&a, &b| {
        totals[b]
            .partial_cmp(&totals[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut rank_of = vec![0; totals.len()];
    for (position, &index) in order.iter().enumerate() {
        rank_of[index] = position + 1;
    }
    rank_of
}
