// Error types for the simulation engine
//
// Only unrecoverable conditions surface as errors: invalid input (checked
// before any trial runs), worker spawn failure, and a per-trial failure
// rate above the configured threshold. Recoverable conditions - a short
// field, dropped trials, cancellation - are reported in the outcome.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    /// Trial count must be at least 1.
    #[error("trial count must be at least 1")]
    InvalidTrialCount,

    /// Contest size must be at least 1.
    #[error("contest size must be at least 1")]
    InvalidContestSize,

    /// Salary cap must be a positive integer.
    #[error("salary cap must be positive")]
    InvalidSalaryCap,

    /// Position requirements must name at least one slot.
    #[error("position requirements are empty")]
    EmptyRosterRequirements,

    /// The player pool is empty.
    #[error("player pool is empty")]
    EmptyPlayerPool,

    /// At least one user lineup must be supplied.
    #[error("at least one user lineup is required")]
    NoLineups,

    /// A user lineup references a player id absent from the pool.
    #[error("lineup {lineup} references unknown player id '{player_id}'")]
    UnknownPlayer { lineup: usize, player_id: String },

    /// A user lineup's size disagrees with the position requirements.
    #[error("lineup {lineup} has {actual} players, position requirements sum to {required}")]
    RosterSizeMismatch {
        lineup: usize,
        required: usize,
        actual: usize,
    },

    /// Too many trials faulted; the run was aborted.
    #[error("fatal failure rate: {failed} of {attempted} trials failed")]
    FatalFailureRate { failed: usize, attempted: usize },

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
