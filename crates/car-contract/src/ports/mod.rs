//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the contract and the host ledger.
//!
//! - **Driving Port (Inbound)**: `CarContractApi`
//! - **Driven Ports (Outbound)**: `WorldState`, `QueryCursor`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
