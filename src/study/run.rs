//! The sequential trial loop.

use super::Study;
use crate::error::Result;
use crate::objective::TrainerObjective;
use crate::types::StudyState;

impl Study {
    /// Runs the search loop for `n_trials` trials.
    ///
    /// Trials run strictly one after another, since each suggestion depends
    /// on the scores recorded before it; the repetitions inside a trial run
    /// as concurrent processes.
    ///
    /// A [`TrialFailed`](crate::Error::TrialFailed) evaluation (a diverging
    /// model, malformed output) is recorded as a failed trial and the loop
    /// continues with the next trial; it never aborts the study and it is
    /// never dropped without a journal record. Every other error is fatal:
    /// the study transitions to [`Aborted`](StudyState::Aborted) and the
    /// error propagates to the caller. Reaching the trial budget
    /// transitions to [`Exhausted`](StudyState::Exhausted).
    ///
    /// # Errors
    ///
    /// Propagates configuration, spawn, and storage errors.
    pub async fn run(&self, n_trials: usize, objective: &TrainerObjective) -> Result<()> {
        self.set_state(StudyState::Running);
        tracing::info!(study = %self.name(), n_trials, "starting study");

        for _ in 0..n_trials {
            let mut trial = self.create_trial();
            let trial_id = trial.id();

            let outcome = match objective.evaluate(&mut trial).await {
                Ok(value) => {
                    tracing::info!(trial_id, value, "trial completed");
                    self.record_complete(trial, value)
                }
                Err(e) if e.is_trial_failure() => {
                    tracing::warn!(
                        trial_id,
                        params = ?trial.params(),
                        error = %source_chain(&e),
                        "trial failed, skipping"
                    );
                    self.record_failed(trial, source_chain(&e))
                }
                Err(e) => Err(e),
            };

            if let Err(e) = outcome {
                self.set_state(StudyState::Aborted);
                tracing::error!(study = %self.name(), error = %e, "study aborted");
                return Err(e);
            }
        }

        self.set_state(StudyState::Exhausted);
        tracing::info!(study = %self.name(), trials = self.n_trials(), "study exhausted");
        Ok(())
    }
}

/// Formats an error with its source chain, so a failed trial's record
/// carries the malformed output that triggered it.
fn source_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
