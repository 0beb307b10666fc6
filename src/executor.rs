//! Concurrent repetition of one invocation with mean aggregation.

use core::time::Duration;

use tokio::task::JoinSet;

use crate::error::{Error, Result};
use crate::invocation::Invocation;
use crate::runner::ProcessRunner;

/// Default delay between consecutive process launches.
const DEFAULT_STAGGER: Duration = Duration::from_millis(25);

/// Evaluates one trial configuration by running its invocation several
/// times concurrently and averaging the scores.
///
/// Trial latency is dominated by single-process wall-clock time, so the
/// repetitions run as truly concurrent processes: R stochastic outcomes in
/// roughly the time of one. Launches are staggered by a small fixed delay
/// to avoid a process-creation spike on the host; once started, all
/// repetitions run in parallel.
///
/// Aggregation is all-or-nothing: one diverging replica is treated as
/// evidence the configuration is unstable, not as noise to average away.
pub struct TrialExecutor {
    runner: ProcessRunner,
    stagger: Duration,
}

impl TrialExecutor {
    /// Creates an executor around the given runner with the default
    /// launch stagger.
    #[must_use]
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            runner,
            stagger: DEFAULT_STAGGER,
        }
    }

    /// Overrides the delay between consecutive process launches.
    #[must_use]
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Runs `repetitions` concurrent instances of `invocation` and returns
    /// the arithmetic mean of their scores.
    ///
    /// Every repetition is awaited to a terminal outcome before anything is
    /// aggregated: a strict join, never a race. If any repetition fails,
    /// the partial successes are discarded and a single
    /// [`TrialFailed`](Error::TrialFailed) is returned, derived from the
    /// first failed repetition in launch order.
    ///
    /// # Errors
    ///
    /// - [`TrialFailed`](Error::TrialFailed) if any repetition produced
    ///   malformed output or a broken stream.
    /// - [`Spawn`](Error::Spawn) and other non-process errors propagate
    ///   unchanged; they are fatal to the study.
    ///
    /// # Panics
    ///
    /// Panics if `repetitions` is zero.
    #[allow(clippy::cast_precision_loss)]
    pub async fn execute(&self, invocation: &Invocation, repetitions: usize) -> Result<f64> {
        assert!(repetitions > 0, "repetitions must be at least 1");

        let mut join_set: JoinSet<(usize, Result<f64>)> = JoinSet::new();
        for index in 0..repetitions {
            if index > 0 {
                tokio::time::sleep(self.stagger).await;
            }
            let runner = self.runner.clone();
            let invocation = invocation.clone();
            join_set.spawn(async move { (index, runner.run(&invocation).await) });
        }

        // Strict join: collect every terminal outcome, keyed by launch order.
        let mut results: Vec<Option<Result<f64>>> = (0..repetitions).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let (index, result) =
                joined.map_err(|_| Error::Internal("repetition task panicked"))?;
            results[index] = Some(result);
        }

        let mut sum = 0.0;
        let mut first_failure: Option<Error> = None;
        for result in results {
            let result = result.ok_or(Error::Internal("repetition result missing"))?;
            match result {
                Ok(value) => sum += value,
                Err(e) if first_failure.is_none() => first_failure = Some(e),
                Err(_) => {}
            }
        }

        match first_failure {
            None => Ok(sum / repetitions as f64),
            Some(e) if e.is_process_failure() => Err(Error::TrialFailed(Box::new(e))),
            Some(e) => Err(e),
        }
    }
}
