//! # Driven Ports (SPI - Outbound)
//!
//! The world state the contract runs against. The host ledger implements
//! these traits.
//!
//! Production: `FileBackedWorldState` (ledger-node/adapters/file_state.rs)
//! Testing: `InMemoryWorldState` (adapters/memory_state.rs)

use crate::errors::StateError;

// =============================================================================
// WRITE OPERATIONS
// =============================================================================

/// Single mutation inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Store `value` under `key`, replacing any previous value.
    Put {
        /// Record key.
        key: String,
        /// Encoded record.
        value: Vec<u8>,
    },
    /// Remove `key`. The key must exist.
    Delete {
        /// Record key.
        key: String,
    },
}

impl WriteOp {
    /// Create a Put operation.
    pub fn put(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        WriteOp::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<String>) -> Self {
        WriteOp::Delete { key: key.into() }
    }

    /// Key touched by this operation.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

// =============================================================================
// QUERY CURSOR
// =============================================================================

/// One row returned by a rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    /// Record key.
    pub key: String,
    /// Encoded record.
    pub value: Vec<u8>,
}

/// Forward-only, finite, non-restartable result cursor.
///
/// Holds a query handle in the provider. `close` must be called once the
/// caller is done, on every exit path.
pub trait QueryCursor {
    /// Next row, or `None` when exhausted.
    fn next_record(&mut self) -> Option<Result<QueryRecord, StateError>>;

    /// Release the query handle.
    fn close(&mut self) -> Result<(), StateError>;
}

// =============================================================================
// WORLD STATE
// =============================================================================

/// Key-value world state with a rich-query capability.
pub trait WorldState: Send + Sync {
    /// Get the value stored under `key`.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError>;

    /// Execute an atomic batch write.
    ///
    /// ## Atomicity Guarantee
    ///
    /// Either ALL operations in the batch are applied, or NONE are. A
    /// `Delete` of an absent key fails the whole batch with
    /// `StateError::KeyNotFound`.
    fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StateError>;

    /// Run a selector query. Rows are returned in provider order.
    fn get_query_result(&self, query: &str) -> Result<Box<dyn QueryCursor + '_>, StateError>;

    /// Store a single value.
    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StateError> {
        self.apply_batch(vec![WriteOp::put(key, value)])
    }

    /// Delete a single key. Fails if the key is absent.
    fn del_state(&self, key: &str) -> Result<(), StateError> {
        self.apply_batch(vec![WriteOp::delete(key)])
    }
}
