mod check;
mod run;
mod state;

use std::collections::HashMap;

use ipowatch_core::config::{ENV_REQUEST_TIMEOUT_MS, ENV_STATE_FILE, ENV_SYMBOL};
use ipowatch_core::Config;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = resolve_config(cli, |key| std::env::var(key).ok())?;

    match cli.command() {
        Command::Run => run::run(&config).await,
        Command::Check => check::run(&config).await,
        Command::State => state::run(&config),
    }
}

/// Flags win over the environment; both go through the same validation.
fn resolve_config<F>(cli: &Cli, env: F) -> Result<Config, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = HashMap::new();
    if let Some(symbol) = &cli.symbol {
        overrides.insert(ENV_SYMBOL, symbol.clone());
    }
    if let Some(state_file) = &cli.state_file {
        overrides.insert(ENV_STATE_FILE, state_file.display().to_string());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        overrides.insert(ENV_REQUEST_TIMEOUT_MS, timeout_ms.to_string());
    }

    Ok(Config::from_lookup(|key| {
        overrides.get(key).cloned().or_else(|| env(key))
    })?)
}
