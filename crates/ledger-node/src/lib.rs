//! # Ledger Node - Car Contract Host Runtime
//!
//! Opens the file-backed world state, runs one contract operation and
//! returns its JSON result.
//!
//! ## Startup Order
//!
//! 1. Load `NodeConfig` (defaults, environment, flags) and validate
//! 2. Install logging on stderr
//! 3. Open and lock the state document
//! 4. Dispatch the named operation

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod logging;

use std::sync::Arc;

use anyhow::Context;
use car_contract::dispatch;
use car_contract::errors::ContractError;
use car_contract::service::CarContract;
use serde_json::Value;
use tracing::{info, instrument};

pub use adapters::{FileBackedWorldState, StateLock};
pub use config::{ConfigError, NodeConfig};

/// Run `function` with `args` against the state named by `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the state cannot be
/// opened, or the operation fails.
#[instrument(skip(config, args), fields(state = %config.state_path.display()))]
pub fn run(config: &NodeConfig, function: &str, args: &[String]) -> anyhow::Result<Value> {
    config.validate().context("invalid configuration")?;

    let state = FileBackedWorldState::open(&config.state_path, adapters::DEFAULT_LOCK_TIMEOUT)
        .with_context(|| format!("failed to open world state {}", config.state_path.display()))?;
    let contract = CarContract::new(Arc::new(state), config.contract_config());

    let result = dispatch::invoke(&contract, function, args)
        .with_context(|| format!("{function} failed"))?;
    info!(function = %function, "Invocation completed");
    Ok(result)
}

/// Error taxonomy name reported for a failed invocation.
///
/// Contract failures keep their own category. Anything else (configuration,
/// locking, file I/O) is a `RuntimeError`.
#[must_use]
pub fn failure_category(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<ContractError>()
        .map_or("RuntimeError", ContractError::category)
}
