//! Study implementation: durable record keeping plus the sequential trial loop.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::sampler::{Sampler, TrialRecord};
use crate::storage::Storage;
use crate::trial::Trial;
use crate::types::{Direction, StudyState, TrialState};

mod builder;
mod run;

pub use builder::StudyBuilder;

/// A named, bounded sequence of trials driven toward minimizing one scalar
/// objective.
///
/// The study owns the storage backend exclusively (it is the only writer
/// to its journal) and holds the sampler that proposes each trial's
/// parameter assignment. Its lifecycle is
/// [`Created` → `Running` → `Exhausted` | `Aborted`](StudyState).
///
/// # Examples
///
/// ```no_run
/// use tuner::sampler::random::RandomSampler;
/// use tuner::Study;
///
/// let study = Study::open("studies", "m5_tsmixer", RandomSampler::new()).unwrap();
/// assert_eq!(study.name(), "m5_tsmixer");
/// ```
pub struct Study {
    name: String,
    direction: Direction,
    sampler: Arc<dyn Sampler>,
    storage: Arc<dyn Storage>,
    state: RwLock<StudyState>,
}

impl Study {
    /// Returns a [`StudyBuilder`] for constructing a study with a fluent API.
    #[must_use]
    pub fn builder() -> StudyBuilder {
        StudyBuilder::new()
    }

    /// Opens (or creates) a journal-backed study.
    ///
    /// The journal lives at `<journal_dir>/<name>.jsonl`; the directory is
    /// created if it does not exist yet. Reopening an existing journal
    /// reconstructs every previously recorded trial, so a study can be
    /// resumed with a larger trial budget.
    ///
    /// # Errors
    ///
    /// Returns [`Storage`](Error::Storage) if the directory cannot be
    /// created or the journal cannot be read.
    pub fn open(
        journal_dir: impl AsRef<Path>,
        name: &str,
        sampler: impl Sampler + 'static,
    ) -> Result<Self> {
        Self::builder()
            .name(name)
            .sampler(sampler)
            .journal_dir(journal_dir.as_ref())
            .build()
    }

    pub(crate) fn from_parts(
        name: String,
        direction: Direction,
        sampler: Arc<dyn Sampler>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            name,
            direction,
            sampler,
            storage,
            state: RwLock::new(StudyState::Created),
        }
    }

    /// The study name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StudyState {
        *self.state.read()
    }

    pub(crate) fn set_state(&self, state: StudyState) {
        *self.state.write() = state;
    }

    /// Creates a new trial wired to the study's sampler and history.
    #[must_use]
    pub fn create_trial(&self) -> Trial {
        Trial::with_sampler(
            self.storage.next_trial_id(),
            Arc::clone(&self.sampler),
            Arc::clone(self.storage.trials_arc()),
        )
    }

    /// The number of recorded trials, failed ones included.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.storage.trials_arc().read().len()
    }

    /// A snapshot of every recorded trial.
    #[must_use]
    pub fn trials(&self) -> Vec<TrialRecord> {
        self.storage.trials_arc().read().clone()
    }

    /// The best completed trial according to the study direction.
    ///
    /// # Errors
    ///
    /// Returns [`NoCompletedTrials`](Error::NoCompletedTrials) if nothing
    /// has completed yet.
    pub fn best_trial(&self) -> Result<TrialRecord> {
        let trials = self.storage.trials_arc().read();
        let mut best: Option<&TrialRecord> = None;
        for trial in trials.iter() {
            let Some(value) = trial.value else { continue };
            if trial.state != TrialState::Complete {
                continue;
            }
            let improved = match best.and_then(|b| b.value) {
                None => true,
                Some(best_value) => match self.direction {
                    Direction::Minimize => value < best_value,
                    Direction::Maximize => value > best_value,
                },
            };
            if improved {
                best = Some(trial);
            }
        }
        best.cloned().ok_or(Error::NoCompletedTrials)
    }

    /// The best completed objective value.
    ///
    /// # Errors
    ///
    /// Returns [`NoCompletedTrials`](Error::NoCompletedTrials) if nothing
    /// has completed yet.
    pub fn best_value(&self) -> Result<f64> {
        self.best_trial()?
            .value
            .ok_or(Error::Internal("best trial has no value"))
    }

    /// Records a completed trial and makes its score visible to the sampler.
    pub(crate) fn record_complete(&self, trial: Trial, value: f64) -> Result<()> {
        self.storage
            .push(trial.into_record(Some(value), TrialState::Complete, None))
    }

    /// Records a failed trial. No score reaches the sampler.
    pub(crate) fn record_failed(&self, trial: Trial, error: String) -> Result<()> {
        self.storage
            .push(trial.into_record(None, TrialState::Failed, Some(error)))
    }
}
