//! # Driving Ports (API - Inbound)
//!
//! The operations the contract exposes to the host ledger. Each call is one
//! invocation: it either commits all of its writes or none.

use crate::domain::entities::{Car, User};
use crate::domain::value_objects::Amount;
use crate::errors::ContractResult;
use serde::{Deserialize, Serialize};

// =============================================================================
// RESULTS
// =============================================================================

/// Outcome of recording a malfunction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MalfunctionOutcome {
    /// Malfunction appended; `total_cost` is the car's new repair cost.
    Recorded {
        /// Sum of all recorded malfunction prices.
        #[serde(rename = "totalCost")]
        total_cost: Amount,
    },
    /// Repair cost exceeded the car's price; the car was deleted.
    WrittenOff {
        /// Deleted car.
        #[serde(rename = "carId")]
        car_id: String,
    },
}

/// Settlement of a completed sale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    /// Car that changed hands.
    pub car_id: String,
    /// Previous owner, credited with `price`.
    pub seller: String,
    /// New owner, debited by `price`.
    pub buyer: String,
    /// Amount transferred (list price less acknowledged repair cost).
    pub price: Amount,
}

/// Settlement of a completed repair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReceipt {
    /// Repaired car.
    pub car_id: String,
    /// Owner debited by `cost`.
    pub owner: String,
    /// Repair-service account credited by `cost`.
    pub mechanic: String,
    /// Sum of the cleared malfunction prices.
    pub cost: Amount,
}

// =============================================================================
// CAR CONTRACT API (Primary Driving Port)
// =============================================================================

/// Operation surface of the car marketplace contract.
pub trait CarContractApi: Send + Sync {
    /// Write the fixed seed set, overwriting existing keys.
    fn init_ledger(&self) -> ContractResult<()>;

    /// Read a car by key.
    fn read_car(&self, id: &str) -> ContractResult<Car>;

    /// Read a user by key.
    fn read_user(&self, id: &str) -> ContractResult<User>;

    /// Repaint a car.
    fn change_color(&self, id: &str, color: &str) -> ContractResult<()>;

    /// Record a malfunction, writing the car off if repairs exceed its value.
    fn add_malfunction(
        &self,
        id: &str,
        description: &str,
        price: Amount,
    ) -> ContractResult<MalfunctionOutcome>;

    /// Delete any record by key.
    fn delete_asset(&self, id: &str) -> ContractResult<()>;

    /// True if any record is stored under `id`.
    fn asset_exists(&self, id: &str) -> ContractResult<bool>;

    /// Transfer a car to `new_owner_id` against payment.
    fn buy_car(
        &self,
        id: &str,
        new_owner_id: &str,
        acknowledge_malfunctions: bool,
    ) -> ContractResult<SaleReceipt>;

    /// Repair every malfunction, paying the mechanic account.
    fn fix_car(&self, id: &str) -> ContractResult<RepairReceipt>;

    /// Cars of a color.
    fn query_assets_by_color(&self, color: &str) -> ContractResult<Vec<Car>>;

    /// Cars of an owner.
    fn query_assets_by_owner(&self, owner: &str) -> ContractResult<Vec<Car>>;

    /// Cars of a color and owner.
    fn query_assets_by_color_and_owner(&self, color: &str, owner: &str)
        -> ContractResult<Vec<Car>>;

    /// Raw selector query; every match must decode as a car.
    fn query_assets(&self, query: &str) -> ContractResult<Vec<Car>>;
}
