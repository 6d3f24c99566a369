//! # Domain Invariants
//!
//! Business rules shared by the operation handlers.
//!
//! | Rule | Function |
//! |------|----------|
//! | Malfunction price strictly positive | `check_malfunction_price` |
//! | Write-off when total repair cost exceeds car price | `is_write_off` |
//! | Sale price reduced by acknowledged repair cost | `effective_sale_price` |
//! | Transfers conserve the total balance | `balances_conserved` |

use crate::domain::entities::Car;
use crate::domain::value_objects::Amount;
use crate::errors::{ContractResult, ValidationError};

/// Reject zero or negative malfunction prices.
pub fn check_malfunction_price(price: Amount) -> Result<(), ValidationError> {
    if price.is_positive() {
        Ok(())
    } else {
        Err(ValidationError::NonPositivePrice { price })
    }
}

/// A car is written off once its accumulated repair cost exceeds its price.
#[must_use]
pub fn is_write_off(car_price: Amount, total_repair_cost: Amount) -> bool {
    total_repair_cost > car_price
}

/// Price the buyer pays for `car`.
///
/// With no malfunctions this is the list price. With malfunctions the sale
/// only proceeds when the buyer acknowledges them, and the repair cost is
/// deducted. No floor is applied.
pub fn effective_sale_price(car: &Car, acknowledged: bool) -> ContractResult<Amount> {
    let malfunction_cost = car.malfunction_cost()?;
    if !malfunction_cost.is_positive() {
        return Ok(car.price);
    }
    if !acknowledged {
        return Err(ValidationError::PurchaseCancelled {
            car_id: car.id.clone(),
            malfunction_cost,
        }
        .into());
    }
    Ok(car
        .price
        .checked_sub(malfunction_cost)
        .ok_or(ValidationError::AmountOverflow)?)
}

/// Total balance before and after a settlement is identical.
#[must_use]
pub fn balances_conserved(before: &[Amount], after: &[Amount]) -> bool {
    match (
        Amount::checked_sum(before.iter().copied()),
        Amount::checked_sum(after.iter().copied()),
    ) {
        (Some(b), Some(a)) => a == b,
        _ => false,
    }
}
