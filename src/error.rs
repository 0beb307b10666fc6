#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when categorical choices are empty.
    #[error("categorical choices cannot be empty")]
    EmptyChoices,

    /// Returned when a parameter is suggested again with a different configuration.
    #[error("parameter conflict for '{name}': {reason}")]
    ParameterConflict {
        /// The name of the conflicting parameter.
        name: String,
        /// The reason for the conflict.
        reason: String,
    },

    /// Returned when the model-class selector names no known trainer model.
    #[error("unknown model class '{0}', expected one of: tsmixer, deepar")]
    UnknownModelClass(String),

    /// Returned when an objective is configured with zero repetitions per trial.
    #[error("tests per trial must be at least 1")]
    InvalidRepetitions,

    /// Returned when requesting the best trial but no trials have completed.
    #[error("no completed trials available")]
    NoCompletedTrials,

    /// Returned when a trainer process cannot be started at all.
    #[error("failed to spawn trainer process '{program}'")]
    Spawn {
        /// The executable that could not be started.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Returned when reading a trainer's output stream fails mid-run.
    #[error("output stream of process {pid} failed")]
    ProcessStream {
        /// The operating-system process id.
        pid: u32,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Returned when a trainer's last non-empty output line is missing or
    /// cannot be interpreted as a score.
    ///
    /// This is never coerced to a number: a diverged model printing garbage
    /// must stay distinguishable from a model reporting a low score.
    #[error("process {pid} produced no parseable result (last line: {raw:?})")]
    MalformedOutput {
        /// The operating-system process id.
        pid: u32,
        /// The last non-empty line observed, if any.
        raw: Option<String>,
    },

    /// Returned when any repetition of a trial fails; recoverable at the
    /// study level (the trial is recorded as failed and the study continues).
    #[error("trial failed")]
    TrialFailed(#[source] Box<Error>),

    /// Returned when the journal cannot be created, opened, or appended.
    #[error("storage error: {0}")]
    Storage(String),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Whether this error is a trial-level failure the study loop recovers
    /// from by skipping the trial.
    #[must_use]
    pub fn is_trial_failure(&self) -> bool {
        matches!(self, Error::TrialFailed(_))
    }

    /// Whether this error is a per-process failure that aggregates into
    /// [`Error::TrialFailed`] rather than aborting the study.
    pub(crate) fn is_process_failure(&self) -> bool {
        matches!(
            self,
            Error::MalformedOutput { .. } | Error::ProcessStream { .. }
        )
    }
}
