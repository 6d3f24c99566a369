//! # Car Contract - Transactional Marketplace Rules
//!
//! Rule engine for a car marketplace running against a key-value world
//! state. Users hold balances, cars carry an owner and a list of
//! malfunctions, and every invocation either commits all of its writes or
//! none of them.
//!
//! ## Business Rules
//!
//! | Rule | Enforcement Location |
//! |------|---------------------|
//! | Malfunction price must be positive | `domain/invariants.rs` - `check_malfunction_price()` |
//! | Repair cost above car price writes the car off | `domain/invariants.rs` - `is_write_off()` |
//! | Unacknowledged malfunctions cancel a sale | `domain/invariants.rs` - `effective_sale_price()` |
//! | Transfers conserve the balance sum | `service.rs` - `buy_car()`, `fix_car()` |
//! | One batch per invocation | `transaction.rs` - `Transaction::commit()` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `WorldState` | Point reads, atomic write batches, rich queries |
//! | `QueryCursor` | Iteration over query matches, released on every path |
//!
//! ## Usage Example
//!
//! ```
//! use car_contract::prelude::*;
//! use std::sync::Arc;
//!
//! let contract = CarContract::new(Arc::new(InMemoryWorldState::new()), ContractConfig::default());
//! contract.init_ledger().unwrap();
//!
//! let outcome = contract
//!     .add_malfunction("car1", "Flat tires", Amount::from_units(850))
//!     .unwrap();
//! assert_eq!(outcome, MalfunctionOutcome::Recorded { total_cost: Amount::from_units(850) });
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;
pub mod transaction;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{Car, DocType, Entity, Malfunction, User};

    // Value objects
    pub use crate::domain::value_objects::Amount;

    // Query construction
    pub use crate::domain::selector::{AssetQuery, CarFilter};

    // Seed data
    pub use crate::domain::seed::SeedSet;

    // Ports
    pub use crate::ports::inbound::{
        CarContractApi, MalfunctionOutcome, RepairReceipt, SaleReceipt,
    };
    pub use crate::ports::outbound::{QueryCursor, QueryRecord, WorldState, WriteOp};

    // Errors
    pub use crate::errors::{
        ContractError, ContractResult, StateError, ValidationError,
    };

    // Service
    pub use crate::service::{CarContract, ContractConfig, DEFAULT_MECHANIC_ID};

    // Unit of work
    pub use crate::transaction::{ScopedCursor, Transaction};

    // Dispatch
    pub use crate::dispatch::{execute, invoke, Operation};

    // Adapters
    pub use crate::adapters::{InMemoryWorldState, Selector};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
