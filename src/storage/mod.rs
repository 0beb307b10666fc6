//! Trial storage backends.
//!
//! The [`Storage`] trait defines how trial records are persisted and
//! retrieved. Every [`Study`](crate::Study) owns an `Arc<dyn Storage>` and
//! is the only writer to it; concurrent studies must not share a backend.
//!
//! # Available backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryStorage`] | In-memory `Vec` behind a read-write lock (the default) |
//! | [`JournalStorage`] | Append-only JSONL file with `fs2` file locking |
//!
//! The in-memory backend is sufficient for throwaway studies. Use
//! [`JournalStorage`] when a study must survive a process restart: reopening
//! the same file replays every recorded trial.

mod journal;
mod memory;

use std::sync::Arc;

pub use journal::JournalStorage;
pub use memory::MemoryStorage;
use parking_lot::RwLock;

use crate::error::Result;
use crate::sampler::TrialRecord;

/// Trait for storing and retrieving trial records.
pub trait Storage: Send + Sync {
    /// Append a record to the store.
    ///
    /// # Errors
    ///
    /// Returns [`Storage`](crate::Error::Storage) if the record cannot be
    /// durably appended. An append failure is fatal to the owning study.
    fn push(&self, record: TrialRecord) -> Result<()>;

    /// Return a reference to the in-memory record buffer.
    ///
    /// All implementations must maintain an `Arc<RwLock<Vec<…>>>` that
    /// reflects the current set of records. Callers may acquire a read
    /// lock for efficient, allocation-free access.
    fn trials_arc(&self) -> &Arc<RwLock<Vec<TrialRecord>>>;

    /// Atomically return the next unique trial ID.
    ///
    /// Each call increments an internal counter so that consecutive
    /// calls always produce distinct IDs. After reopening a journal the
    /// counter continues past the largest recorded ID.
    fn next_trial_id(&self) -> u64;
}
