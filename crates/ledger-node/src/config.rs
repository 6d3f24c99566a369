//! # Node Configuration
//!
//! Defaults, overridden by environment variables, overridden by command-line
//! flags.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `CAR_LEDGER_STATE_PATH` | `state_path` | `./data/world-state.json` |
//! | `CAR_LEDGER_MECHANIC_ID` | `mechanic_id` | `user3` |
//! | `CAR_LEDGER_LOG` | `log_level` | `info` |

use std::path::PathBuf;

use car_contract::service::{ContractConfig, DEFAULT_MECHANIC_ID};
use thiserror::Error;
use tracing::debug;

/// Environment variable for the state file path.
pub const ENV_STATE_PATH: &str = "CAR_LEDGER_STATE_PATH";
/// Environment variable for the repair-service account.
pub const ENV_MECHANIC_ID: &str = "CAR_LEDGER_MECHANIC_ID";
/// Environment variable for the log filter.
pub const ENV_LOG_LEVEL: &str = "CAR_LEDGER_LOG";

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// World state document.
    pub state_path: PathBuf,
    /// Account credited by `FixCar`.
    pub mechanic_id: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("./data/world-state.json"),
            mechanic_id: DEFAULT_MECHANIC_ID.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl NodeConfig {
    /// Load from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = var(ENV_STATE_PATH) {
            debug!(path = %path, "State path from environment");
            config.state_path = PathBuf::from(path);
        }
        if let Some(mechanic) = var(ENV_MECHANIC_ID) {
            config.mechanic_id = mechanic;
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        config
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStatePath);
        }
        if self.mechanic_id.trim().is_empty() {
            return Err(ConfigError::EmptyMechanicId);
        }
        Ok(())
    }

    /// Contract configuration derived from this node configuration.
    #[must_use]
    pub fn contract_config(&self) -> ContractConfig {
        ContractConfig::default().with_mechanic(self.mechanic_id.clone())
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No state file path.
    #[error("state path must not be empty")]
    EmptyStatePath,

    /// No repair-service account.
    #[error("mechanic id must not be empty")]
    EmptyMechanicId,
}
