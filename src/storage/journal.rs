//! JSONL-based journal storage backend.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::{Mutex, RwLock};

use super::{MemoryStorage, Storage};
use crate::error::Result;
use crate::sampler::TrialRecord;

/// A storage backend that appends trial records as JSON lines to a file.
///
/// Records are kept in memory for fast read access and simultaneously
/// persisted to a JSONL file, one line per completed or failed trial. The
/// file is never rewritten or compacted. Writes take an exclusive file
/// lock, reads a shared one, so a stray reader (e.g. `tail -f` tooling or
/// an inspection script) never observes a torn line.
///
/// # Examples
///
/// ```no_run
/// use tuner::storage::JournalStorage;
///
/// let storage = JournalStorage::open("studies/m5.jsonl").unwrap();
/// ```
pub struct JournalStorage {
    memory: MemoryStorage,
    path: PathBuf,
    /// Serialise in-process writes so we only hold the file lock briefly.
    write_lock: Mutex<()>,
}

impl JournalStorage {
    /// Opens a journal file, loading every stored record.
    ///
    /// If the file does not exist yet, returns an empty storage (no error);
    /// the file is created on the first append. Trial IDs continue past the
    /// largest recorded ID, so a reopened study never reuses one.
    ///
    /// # Errors
    ///
    /// Returns a [`Storage`](crate::Error::Storage) error if the file
    /// exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = load_records_from_file(&path)?;
        Ok(Self {
            memory: MemoryStorage::with_trials(records),
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// The journal file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single record to the JSONL file.
    fn write_to_file(&self, record: &TrialRecord) -> Result<()> {
        let _guard = self.write_lock.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.storage_error(&e))?;

        file.lock_exclusive().map_err(|e| self.storage_error(&e))?;

        let line = serde_json::to_string(record).map_err(|e| self.storage_error(&e))?;

        writeln!(file, "{line}").map_err(|e| self.storage_error(&e))?;
        file.flush().map_err(|e| self.storage_error(&e))?;

        file.unlock().map_err(|e| self.storage_error(&e))?;

        Ok(())
    }

    fn storage_error(&self, cause: &dyn core::fmt::Display) -> crate::Error {
        crate::Error::Storage(format!("{}: {cause}", self.path.display()))
    }
}

impl Storage for JournalStorage {
    fn push(&self, record: TrialRecord) -> Result<()> {
        // The record only counts once it is durable; an append failure
        // must surface to the study, not leave a memory-only trial.
        self.write_to_file(&record)?;
        self.memory.push(record)
    }

    fn trials_arc(&self) -> &Arc<RwLock<Vec<TrialRecord>>> {
        self.memory.trials_arc()
    }

    fn next_trial_id(&self) -> u64 {
        self.memory.next_trial_id()
    }
}

/// Read all records from a JSONL file. Returns an empty vec if the
/// file does not exist.
fn load_records_from_file(path: &Path) -> Result<Vec<TrialRecord>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(storage_error(path, &e)),
    };

    file.lock_shared().map_err(|e| storage_error(path, &e))?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| storage_error(path, &e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: TrialRecord =
            serde_json::from_str(line).map_err(|e| storage_error(path, &e))?;
        records.push(record);
    }

    file.unlock().map_err(|e| storage_error(path, &e))?;

    Ok(records)
}

fn storage_error(path: &Path, cause: &dyn core::fmt::Display) -> crate::Error {
    crate::Error::Storage(format!("{}: {cause}", path.display()))
}
