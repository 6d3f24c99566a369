//! # Error Types
//!
//! All error types for contract invocations.
//!
//! Every error is terminal for the current invocation. Because all writes of
//! a handler are committed through a single batch, no error leaves the world
//! state partially updated.

use crate::domain::entities::DocType;
use crate::domain::value_objects::Amount;
use thiserror::Error;

/// Result alias used by every contract operation.
pub type ContractResult<T> = Result<T, ContractError>;

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// Errors surfaced to the caller of a contract operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContractError {
    /// Referenced user or car key is absent.
    #[error("the {kind} {id} does not exist")]
    NotFound {
        /// Expected record kind.
        kind: DocType,
        /// Missing key.
        id: String,
    },

    /// Referenced key is absent and its kind is unknown (asset deletion).
    #[error("the asset {0} does not exist")]
    AssetNotFound(String),

    /// Business rule rejected the operation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Balance below the amount required for a purchase or repair.
    #[error("user {user_id} doesn't have enough money: required {required}, available {available}")]
    InsufficientFunds {
        /// Paying user.
        user_id: String,
        /// Amount the operation needs.
        required: Amount,
        /// Current balance.
        available: Amount,
    },

    /// Stored bytes do not match the expected entity shape.
    #[error("failed to decode record {key}: {reason}")]
    Decode {
        /// Record key.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// Entity could not be serialized.
    #[error("failed to encode record {key}: {reason}")]
    Encode {
        /// Record key.
        key: String,
        /// Encoder message.
        reason: String,
    },

    /// Underlying world state call failed.
    #[error("world state error: {0}")]
    Persistence(#[from] StateError),

    /// Text argument could not be parsed.
    #[error("invalid argument {name}={value:?}: {reason}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Raw text supplied.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Wrong number of arguments for a named function.
    #[error("function {function} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        /// Function name.
        function: &'static str,
        /// Parameters it takes.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
    },

    /// No operation with this name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
}

impl ContractError {
    /// Taxonomy name of this error.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::AssetNotFound(_) => "NotFound",
            Self::Validation(_) => "ValidationError",
            Self::InsufficientFunds { .. } => "InsufficientFunds",
            Self::Decode { .. } => "DecodeError",
            Self::Encode { .. } | Self::Persistence(_) => "PersistenceError",
            Self::InvalidArgument { .. } | Self::ArgumentCount { .. } | Self::UnknownFunction(_) => {
                "CallerError"
            }
        }
    }

    /// Returns true if the error is caused by the caller's input rather than
    /// by the state of the ledger.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        self.category() == "CallerError"
    }
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// Business-rule violations. The operation aborts with no state change.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Malfunction price must be strictly positive.
    #[error("price can't be zero or lower: {price}")]
    NonPositivePrice {
        /// Rejected price.
        price: Amount,
    },

    /// Sale of a car with repair costs that the buyer did not acknowledge.
    #[error("car purchase of {car_id} has been canceled due to car malfunctions costing {malfunction_cost}")]
    PurchaseCancelled {
        /// Car offered for sale.
        car_id: String,
        /// Outstanding repair cost.
        malfunction_cost: Amount,
    },

    /// Buyer already owns the car.
    #[error("user {owner} already owns car {car_id}")]
    AlreadyOwner {
        /// Car offered for sale.
        car_id: String,
        /// Its current owner, also the buyer.
        owner: String,
    },

    /// Arithmetic on amounts left the representable range.
    #[error("amount overflow")]
    AmountOverflow,
}

// =============================================================================
// STATE ERRORS
// =============================================================================

/// Errors from the world state accessor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// I/O failure in the backing store.
    #[error("state I/O error: {0}")]
    Io(String),

    /// Backing store content is unreadable.
    #[error("state corruption detected: {0}")]
    Corrupted(String),

    /// Delete of an absent key.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Query string rejected by the query facility.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// State provider cannot serve requests.
    #[error("state unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// TESTS
// =============================================================================
