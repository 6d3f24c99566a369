//! # In-Memory World State
//!
//! `WorldState` implementation for tests and embedded use. Batches are
//! applied to a working copy and swapped in only when every operation
//! succeeds.

use crate::adapters::rich_query::Selector;
use crate::errors::StateError;
use crate::ports::outbound::{QueryCursor, QueryRecord, WorldState, WriteOp};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory world state.
///
/// Query results are returned in key order. Open cursor handles are counted
/// so callers can verify that every cursor was released.
#[derive(Debug, Default)]
pub struct InMemoryWorldState {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
    open_cursors: Arc<AtomicUsize>,
    injected_fault: Mutex<Option<StateError>>,
}

impl InMemoryWorldState {
    /// Create a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copy of every stored record.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.records.read().clone()
    }

    /// Cursors handed out and not yet closed.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Make the next `apply_batch` fail with `error` without applying anything.
    pub fn fail_next_batch(&self, error: StateError) {
        *self.injected_fault.lock() = Some(error);
    }
}

impl WorldState for InMemoryWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StateError> {
        if let Some(fault) = self.injected_fault.lock().take() {
            return Err(fault);
        }

        let mut records = self.records.write();
        let mut working = records.clone();
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
        *records = working;
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

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCursor {
            rows: rows.into_iter(),
            open_cursors: Arc::clone(&self.open_cursors),
            closed: false,
        }))
    }
}

/// Snapshot cursor over matched rows.
struct MemoryCursor {
    rows: std::vec::IntoIter<QueryRecord>,
    open_cursors: Arc<AtomicUsize>,
    closed: bool,
}

impl QueryCursor for MemoryCursor {
    fn next_record(&mut self) -> Option<Result<QueryRecord, StateError>> {
        if self.closed {
            return None;
        }
        self.rows.next().map(Ok)
    }

    fn close(&mut self) -> Result<(), StateError> {
        if !self.closed {
            self.closed = true;
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
