//! # Adapters
//!
//! - `FileBackedWorldState` - JSON document on disk
//! - `StateLock` - exclusive `fs2` lock next to the document

pub mod file_state;
pub mod lock;

pub use file_state::FileBackedWorldState;
pub use lock::{LockError, StateLock, DEFAULT_LOCK_TIMEOUT};
