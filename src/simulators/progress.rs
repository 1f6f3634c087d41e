//! Progress Reporter
//!
//! A dedicated ticker thread that samples the shared completed-trial
//! counter every 100 ms and pushes a snapshot to the caller's channel.
//! Sends are non-blocking: when the sink is full the snapshot is dropped,
//! so a slow consumer can never stall the simulation.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

/// Reporting interval.
const TICK: Duration = Duration::from_millis(100);

/// One progress observation
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    /// Total trials requested
    pub trial_total: usize,
    /// Trials completed so far
    pub completed: usize,
    /// Wall-clock start of the run
    pub started_at: SystemTime,
    /// Estimated time remaining, from the running completion rate
    pub eta: Duration,
}

/// Spawn the reporter thread
///
/// The thread exits when `stop` is set or every trial is accounted for.
/// One final snapshot is emitted on the way out so consumers observe the
/// terminal count.
pub fn spawn_reporter(
    trial_total: usize,
    completed: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    sink: SyncSender<ProgressSnapshot>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let started_wall = SystemTime::now();
        let started = Instant::now();

        loop {
            let done = completed.load(Ordering::Relaxed);
            let snapshot = ProgressSnapshot {
                trial_total,
                completed: done,
                started_at: started_wall,
                eta: estimate_eta(started.elapsed(), done, trial_total),
            };
            match sink.try_send(snapshot) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => return,
            }

            if stop.load(Ordering::Relaxed) || done >= trial_total {
                return;
            }
            thread::sleep(TICK);
        }
    })
}

/// ETA from the running completion rate
///
/// Zero until the first trial completes (no rate to extrapolate from).
fn estimate_eta(elapsed: Duration, completed: usize, total: usize) -> Duration {
    if completed == 0 || completed >= total {
        return Duration::ZERO;
    }
    let per_trial = elapsed.as_secs_f64() / completed as f64;
    Duration::from_secs_f64(per_trial * (total - completed) as f64)
}
