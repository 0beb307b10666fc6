//! Fluent construction of studies.

use std::path::PathBuf;
use std::sync::Arc;

use super::Study;
use crate::error::{Error, Result};
use crate::sampler::random::RandomSampler;
use crate::sampler::Sampler;
use crate::storage::{JournalStorage, MemoryStorage, Storage};
use crate::types::Direction;

/// Builder for [`Study`].
///
/// Defaults: direction `Minimize`, a fresh [`RandomSampler`], in-memory
/// storage, name `"study"`.
///
/// # Examples
///
/// ```
/// use tuner::sampler::random::RandomSampler;
/// use tuner::Study;
///
/// let study = Study::builder()
///     .name("m5_tsmixer")
///     .minimize()
///     .sampler(RandomSampler::with_seed(42))
///     .build()
///     .unwrap();
/// assert_eq!(study.name(), "m5_tsmixer");
/// ```
pub struct StudyBuilder {
    name: String,
    direction: Direction,
    sampler: Option<Arc<dyn Sampler>>,
    storage: Option<Arc<dyn Storage>>,
    journal_dir: Option<PathBuf>,
}

impl StudyBuilder {
    pub(crate) fn new() -> Self {
        Self {
            name: "study".to_string(),
            direction: Direction::Minimize,
            sampler: None,
            storage: None,
            journal_dir: None,
        }
    }

    /// Sets the study name. The name identifies the journal file.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Minimize the objective value (the default).
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.direction = Direction::Minimize;
        self
    }

    /// Maximize the objective value.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Sets the sampler driving the search.
    #[must_use]
    pub fn sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Arc::new(sampler));
        self
    }

    /// Sets an explicit storage backend.
    #[must_use]
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Backs the study with a journal at `<dir>/<name>.jsonl`.
    ///
    /// Takes precedence over [`storage`](Self::storage). The directory is
    /// created on [`build`](Self::build) if missing.
    #[must_use]
    pub fn journal_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.journal_dir = Some(dir.into());
        self
    }

    /// Builds the study, opening or initializing its storage.
    ///
    /// # Errors
    ///
    /// Returns [`Storage`](Error::Storage) if the journal directory cannot
    /// be created or an existing journal cannot be replayed.
    pub fn build(self) -> Result<Study> {
        let storage: Arc<dyn Storage> = if let Some(dir) = self.journal_dir {
            std::fs::create_dir_all(&dir)
                .map_err(|e| Error::Storage(format!("{}: {e}", dir.display())))?;
            let path = dir.join(format!("{}.jsonl", self.name));
            Arc::new(JournalStorage::open(path)?)
        } else if let Some(storage) = self.storage {
            storage
        } else {
            Arc::new(MemoryStorage::new())
        };

        let sampler = self
            .sampler
            .unwrap_or_else(|| Arc::new(RandomSampler::new()));

        Ok(Study::from_parts(
            self.name,
            self.direction,
            sampler,
            storage,
        ))
    }
}
