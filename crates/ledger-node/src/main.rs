//! ledger-node: run one car contract operation against a world state file.
//!
//! ```text
//! ledger-node [--state PATH] [--mechanic ID] [--log-level LEVEL] <FUNCTION> [ARGS...]
//! ```
//!
//! The JSON result is printed on stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ledger_node::{logging, NodeConfig};
use tracing::error;

/// Car marketplace contract runner
#[derive(Parser, Debug)]
#[command(name = "ledger-node")]
#[command(version, about = "Run one car marketplace operation against a world state file")]
struct Args {
    /// World state file (overrides CAR_LEDGER_STATE_PATH)
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Repair-service account credited by FixCar (overrides CAR_LEDGER_MECHANIC_ID)
    #[arg(short, long)]
    mechanic: Option<String>,

    /// Log filter used when RUST_LOG is unset (overrides CAR_LEDGER_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Contract function, e.g. InitLedger, ReadCar, BuyCar
    function: String,

    /// Positional text arguments for the function
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn load_config(args: &Args) -> NodeConfig {
    let mut config = NodeConfig::from_env();
    if let Some(state) = &args.state {
        config.state_path = state.clone();
    }
    if let Some(mechanic) = &args.mechanic {
        config.mechanic_id = mechanic.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config
}

fn execute(config: &NodeConfig, args: &Args) -> Result<()> {
    let result = ledger_node::run(config, &args.function, &args.args)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = load_config(&args);

    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("RuntimeError: {e:#}");
        return ExitCode::FAILURE;
    }

    match execute(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(category = ledger_node::failure_category(&e), "{e:#}");
            ExitCode::FAILURE
        }
    }
}
