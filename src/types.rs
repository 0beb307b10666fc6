//! Core types shared across the crate.

use serde::{Deserialize, Serialize};

/// The direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Minimize the objective value.
    Minimize,
    /// Maximize the objective value.
    Maximize,
}

/// The state of a trial in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialState {
    /// The trial is currently running.
    Running,
    /// The trial completed successfully.
    Complete,
    /// The trial failed and was skipped.
    Failed,
}

/// The lifecycle of a study.
///
/// `Exhausted` is the normal terminal state: the trial budget was spent and
/// the journal remains on disk for inspection or resumption with a larger
/// budget. `Aborted` means an unrecoverable error surfaced to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudyState {
    /// Storage has been opened or initialized; no trials requested yet.
    Created,
    /// The trial loop is actively requesting and evaluating trials.
    Running,
    /// The requested trial budget was reached.
    Exhausted,
    /// An unrecoverable error terminated the study.
    Aborted,
}
