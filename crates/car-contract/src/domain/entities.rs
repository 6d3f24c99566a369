//! # Domain Entities
//!
//! Records stored in the world state. Users and cars share one key namespace
//! and are told apart by the `docType` discriminator.
//!
//! ## Encoding
//!
//! JSON objects with fixed, case-sensitive field names:
//!
//! | Entity | Fields |
//! |--------|--------|
//! | `User` | `ID`, `docType`, `firstName`, `lastName`, `email`, `balance` |
//! | `Car` | `ID`, `docType`, `brand`, `model`, `year`, `color`, `owner`, `price`, `malfunctions` |
//! | `Malfunction` | `description`, `price` |

use crate::domain::value_objects::Amount;
use crate::errors::{ContractError, ContractResult, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// DISCRIMINATOR
// =============================================================================

/// Entity kind tag stored in every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// `"user"`
    User,
    /// `"car"`
    Car,
}

impl DocType {
    /// Encoded tag value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Car => "car",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ENTITY TRAIT
// =============================================================================

/// A record stored under its own ID in the world state.
pub trait Entity: Serialize + DeserializeOwned {
    /// Discriminator every record of this kind carries.
    const DOC_TYPE: DocType;

    /// World-state key.
    fn id(&self) -> &str;

    /// Discriminator carried by this instance.
    fn doc_type(&self) -> DocType;
}

/// Serialize an entity into its stored form.
pub fn encode<E: Entity>(entity: &E) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(entity).map_err(|e| ContractError::Encode {
        key: entity.id().to_string(),
        reason: e.to_string(),
    })
}

/// Decode stored bytes as `E`.
///
/// Fails when the bytes have the wrong shape or carry another kind's
/// discriminator.
pub fn decode<E: Entity>(key: &str, bytes: &[u8]) -> ContractResult<E> {
    let entity: E = serde_json::from_slice(bytes).map_err(|e| ContractError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    if entity.doc_type() != E::DOC_TYPE {
        return Err(ContractError::Decode {
            key: key.to_string(),
            reason: format!(
                "expected docType {}, found {}",
                E::DOC_TYPE,
                entity.doc_type()
            ),
        });
    }

    Ok(entity)
}

// =============================================================================
// USER
// =============================================================================

/// Marketplace participant holding a currency balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// World state key, e.g. `user1`.
    #[serde(rename = "ID")]
    pub id: String,
    /// Always `DocType::User`.
    #[serde(rename = "docType")]
    pub doc_type: DocType,
    /// Given name.
    #[serde(rename = "firstName")]
    pub first_name: String,
    /// Family name.
    #[serde(rename = "lastName")]
    pub last_name: String,
    /// Contact address.
    pub email: String,
    /// Spendable funds.
    pub balance: Amount,
}

impl User {
    /// Create a user record.
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        balance: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            doc_type: DocType::User,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            balance,
        }
    }

    /// Remove `amount` from the balance.
    ///
    /// Sufficiency is checked by the caller; this only guards the range.
    pub fn debit(&mut self, amount: Amount) -> ContractResult<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(ValidationError::AmountOverflow)?;
        Ok(())
    }

    /// Add `amount` to the balance.
    pub fn credit(&mut self, amount: Amount) -> ContractResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(ValidationError::AmountOverflow)?;
        Ok(())
    }
}

impl Entity for User {
    const DOC_TYPE: DocType = DocType::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn doc_type(&self) -> DocType {
        self.doc_type
    }
}

// =============================================================================
// CAR
// =============================================================================

/// Reported defect with its repair cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Malfunction {
    /// Free-text defect report.
    pub description: String,
    /// Repair cost, strictly positive.
    pub price: Amount,
}

impl Malfunction {
    /// Create a malfunction record.
    pub fn new(description: impl Into<String>, price: Amount) -> Self {
        Self {
            description: description.into(),
            price,
        }
    }
}

/// Vehicle listed on the marketplace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// World state key, e.g. `car1`.
    #[serde(rename = "ID")]
    pub id: String,
    /// Always `DocType::Car`.
    #[serde(rename = "docType")]
    pub doc_type: DocType,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Model year, kept as text.
    pub year: String,
    /// Paint color.
    pub color: String,
    /// `User.ID` of the current owner.
    pub owner: String,
    /// List price before repair costs.
    pub price: Amount,
    /// In report order.
    #[serde(default)]
    pub malfunctions: Vec<Malfunction>,
}

impl Car {
    /// Create a car record with no malfunctions.
    pub fn new(
        id: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        year: impl Into<String>,
        color: impl Into<String>,
        owner: impl Into<String>,
        price: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            doc_type: DocType::Car,
            brand: brand.into(),
            model: model.into(),
            year: year.into(),
            color: color.into(),
            owner: owner.into(),
            price,
            malfunctions: Vec::new(),
        }
    }

    /// Sum of all recorded repair costs.
    pub fn malfunction_cost(&self) -> ContractResult<Amount> {
        Amount::checked_sum(self.malfunctions.iter().map(|m| m.price))
            .ok_or_else(|| ValidationError::AmountOverflow.into())
    }
}

impl Entity for Car {
    const DOC_TYPE: DocType = DocType::Car;

    fn id(&self) -> &str {
        &self.id
    }

    fn doc_type(&self) -> DocType {
        self.doc_type
    }
}

// =============================================================================
// TESTS
// =============================================================================
