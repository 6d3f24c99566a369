//! # Unit of Work
//!
//! Every invocation stages its writes in a `Transaction` and commits them
//! through one `WorldState::apply_batch`. Dropping a transaction without
//! committing applies nothing.
//!
//! Reads see the transaction's own staged writes first. Rich queries run
//! against committed state only.

use crate::domain::entities::{self, Entity};
use crate::errors::{ContractError, ContractResult, StateError};
use crate::ports::outbound::{QueryCursor, QueryRecord, WorldState, WriteOp};
use tracing::{debug, error};
use uuid::Uuid;

// =============================================================================
// TRANSACTION
// =============================================================================

/// Staged write set for one invocation.
pub struct Transaction<'a, S: WorldState + ?Sized> {
    state: &'a S,
    tx_id: Uuid,
    staged: Vec<WriteOp>,
}

impl<'a, S: WorldState + ?Sized> Transaction<'a, S> {
    /// Open a transaction with a fresh ID.
    pub fn begin(state: &'a S) -> Self {
        let tx_id = Uuid::new_v4();
        debug!(tx_id = %tx_id, "Transaction opened");
        Self {
            state,
            tx_id,
            staged: Vec::new(),
        }
    }

    /// Transaction ID.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.tx_id
    }

    /// Number of staged operations.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Raw value under `key`, staged writes first.
    pub fn get(&self, key: &str) -> ContractResult<Option<Vec<u8>>> {
        if let Some(op) = self.staged.iter().rev().find(|op| op.key() == key) {
            return Ok(match op {
                WriteOp::Put { value, .. } => Some(value.clone()),
                WriteOp::Delete { .. } => None,
            });
        }
        Ok(self.state.get_state(key)?)
    }

    /// True if a value is visible under `key`.
    pub fn exists(&self, key: &str) -> ContractResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Read and decode an entity, failing with `NotFound` if absent.
    pub fn read<E: Entity>(&self, id: &str) -> ContractResult<E> {
        let bytes = self.get(id)?.ok_or_else(|| ContractError::NotFound {
            kind: E::DOC_TYPE,
            id: id.to_string(),
        })?;
        entities::decode(id, &bytes)
    }

    /// Stage an entity write under its own ID.
    pub fn put<E: Entity>(&mut self, entity: &E) -> ContractResult<()> {
        let bytes = entities::encode(entity)?;
        self.staged.push(WriteOp::put(entity.id(), bytes));
        Ok(())
    }

    /// Stage the removal of `key`, failing if nothing is stored there.
    pub fn delete(&mut self, key: &str) -> ContractResult<()> {
        if !self.exists(key)? {
            return Err(ContractError::AssetNotFound(key.to_string()));
        }
        self.staged.push(WriteOp::delete(key));
        Ok(())
    }

    /// Run a rich query against committed state, decoding every row as `E`.
    pub fn query<E: Entity>(&self, query_string: &str) -> ContractResult<Vec<E>> {
        debug!(tx_id = %self.tx_id, "Running query");
        query::<E, S>(self.state, query_string)
    }

    /// Apply every staged write atomically.
    ///
    /// Returns the number of operations applied.
    pub fn commit(self) -> ContractResult<usize> {
        let count = self.staged.len();
        if count == 0 {
            return Ok(0);
        }
        debug!(tx_id = %self.tx_id, ops = count, "Committing write set");
        self.state.apply_batch(self.staged)?;
        Ok(count)
    }
}

// =============================================================================
// SCOPED CURSOR
// =============================================================================

/// Cursor that is closed when it goes out of scope.
pub struct ScopedCursor<'a> {
    inner: Box<dyn QueryCursor + 'a>,
    closed: bool,
}

impl<'a> ScopedCursor<'a> {
    /// Take ownership of an open cursor.
    pub fn new(inner: Box<dyn QueryCursor + 'a>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Close explicitly, surfacing the provider's error.
    pub fn close(mut self) -> Result<(), StateError> {
        self.closed = true;
        self.inner.close()
    }
}

impl Iterator for ScopedCursor<'_> {
    type Item = Result<QueryRecord, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.inner.next_record()
    }
}

impl Drop for ScopedCursor<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.inner.close() {
                error!(error = %e, "Failed to close query cursor");
            }
        }
    }
}

/// Run `query` and decode every row as `E`, in cursor order.
///
/// The first decode or cursor error aborts the whole query. The cursor is
/// released on every path.
pub fn query<E: Entity, S: WorldState + ?Sized>(state: &S, query: &str) -> ContractResult<Vec<E>> {
    let mut cursor = ScopedCursor::new(state.get_query_result(query)?);
    let mut results = Vec::new();

    for row in cursor.by_ref() {
        let record = row?;
        results.push(entities::decode::<E>(&record.key, &record.value)?);
    }

    cursor.close()?;
    debug!(doc_type = %E::DOC_TYPE, rows = results.len(), "Query completed");
    Ok(results)
}

// =============================================================================
// TESTS
// =============================================================================
