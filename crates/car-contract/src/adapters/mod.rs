//! # Adapters Layer (Outer Hexagon)
//!
//! World-state implementations shipped with the contract.
//!
//! - `InMemoryWorldState` for tests and embedded hosts
//! - `rich_query::Selector` for adapters without a native query index

pub mod memory_state;
pub mod rich_query;

pub use memory_state::*;
pub use rich_query::Selector;
