//! # Domain Layer (Inner Hexagon)
//!
//! Entity model, value objects, business rules and query construction.
//! No I/O happens here.

pub mod entities;
pub mod invariants;
pub mod seed;
pub mod selector;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use seed::*;
pub use selector::*;
pub use value_objects::*;
