//! # File-Backed World State
//!
//! Persists the world state to a single JSON document:
//!
//! ```text
//! {"version": 1, "records": {"<key>": "<UTF-8 record>", ...}}
//! ```
//!
//! The document is loaded at open and rewritten after every batch through a
//! temporary file in the same directory followed by a rename, so a crash
//! leaves either the old or the new document on disk. An exclusive lock on
//! `<path>.lock` is held for the adapter's lifetime.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use car_contract::adapters::Selector;
use car_contract::errors::StateError;
use car_contract::ports::outbound::{QueryCursor, QueryRecord, WorldState, WriteOp};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::lock::StateLock;

/// Current on-disk document version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    records: BTreeMap<String, String>,
}

/// World state persisted to a JSON file.
#[derive(Debug)]
pub struct FileBackedWorldState {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
    path: PathBuf,
    _lock: StateLock,
}

impl FileBackedWorldState {
    /// Open the state at `path`, creating an empty state if the file is absent.
    ///
    /// # Errors
    ///
    /// - `StateError::Unavailable` if another handle holds the lock
    /// - `StateError::Corrupted` if the file is not a valid state document
    /// - `StateError::Io` on read failures
    pub fn open(path: impl AsRef<Path>, lock_timeout: Duration) -> Result<Self, StateError> {
        let path = path.as_ref().to_path_buf();
        let lock = StateLock::acquire(&path, lock_timeout)?;
        let records = Self::load(&path)?;

        info!(
            path = %path.display(),
            records = records.len(),
            "Opened world state"
        );

        Ok(Self {
            records: RwLock::new(records),
            path,
            _lock: lock,
        })
    }

    /// Path of the state document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn load(path: &Path) -> Result<BTreeMap<String, Vec<u8>>, StateError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file, starting empty");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(StateError::Io(format!("{}: {e}", path.display()))),
        };

        let document: StateDocument = serde_json::from_slice(&bytes)
            .map_err(|e| StateError::Corrupted(format!("{}: {e}", path.display())))?;
        if document.version != FORMAT_VERSION {
            return Err(StateError::Corrupted(format!(
                "{}: unsupported format version {}",
                path.display(),
                document.version
            )));
        }

        Ok(document
            .records
            .into_iter()
            .map(|(key, value)| (key, value.into_bytes()))
            .collect())
    }

    fn save(&self, records: &BTreeMap<String, Vec<u8>>) -> Result<(), StateError> {
        let mut document = StateDocument {
            version: FORMAT_VERSION,
            records: BTreeMap::new(),
        };
        for (key, value) in records {
            let text = String::from_utf8(value.clone()).map_err(|_| {
                StateError::Corrupted(format!("record {key} is not valid UTF-8"))
            })?;
            document.records.insert(key.clone(), text);
        }
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| StateError::Io(format!("failed to encode state: {e}")))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_err = |e: std::io::Error| StateError::Io(format!("{}: {e}", self.path.display()));

        let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
        temp.write_all(&bytes).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl WorldState for FileBackedWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StateError> {
        let mut records = self.records.write();
        let mut working = records.clone();
        let count = ops.len();

        for op in ops {
            match op {
                WriteOp::Put { key, value } => {
                    working.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    if working.remove(&key).is_none() {
                        return Err(StateError::KeyNotFound(key));
                    }
                }
            }
        }

        // Disk first: memory only changes once the new document is in place.
        self.save(&working)?;
        *records = working;
        debug!(ops = count, path = %self.path.display(), "Batch persisted");
        Ok(())
    }

    fn get_query_result(&self, query: &str) -> Result<Box<dyn QueryCursor + '_>, StateError> {
        let selector = Selector::parse(query)?;
        let rows: Vec<QueryRecord> = self
            .records
            .read()
            .iter()
            .filter(|(_, value)| selector.matches_bytes(value))
            .map(|(key, value)| QueryRecord {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        Ok(Box::new(SnapshotCursor {
            rows: rows.into_iter(),
        }))
    }
}

/// Cursor over rows matched at query time.
struct SnapshotCursor {
    rows: std::vec::IntoIter<QueryRecord>,
}

impl QueryCursor for SnapshotCursor {
    fn next_record(&mut self) -> Option<Result<QueryRecord, StateError>> {
        self.rows.next().map(Ok)
    }

    fn close(&mut self) -> Result<(), StateError> {
        self.rows = Vec::new().into_iter();
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
