//! CLI argument definitions for ipowatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | One check-compare-notify-persist cycle (default) |
//! | `check` | Query the sources only and print what they report |
//! | `state` | Print the persisted state |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--symbol` | `$IPO_SYMBOL` or `KLAR` | Ticker to watch |
//! | `--state-file` | `$IPO_STATE_FILE` or `ipo_state.json` | State file path |
//! | `--timeout-ms` | `$IPO_REQUEST_TIMEOUT_MS` or `15000` | Per-source timeout |
//! | `--env-file` | `.env` | Dotenv file loaded before reading the environment |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! # Scheduled run (cron, systemd timer, CI schedule)
//! ipowatch run
//!
//! # See what the sources say about another ticker without touching state
//! ipowatch --symbol ARM check --pretty
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Watches one IPO and sends a Telegram message when its status changes.
#[derive(Debug, Parser)]
#[command(
    name = "ipowatch",
    author,
    version,
    about = "IPO status watcher with Telegram alerts",
    long_about = "ipowatch checks the IPO status of one ticker against Yahoo Finance and the \
NASDAQ IPO calendar, compares it with the status recorded by the previous run, and sends a \
Telegram message when it changed.\n\
\n\
Each invocation performs exactly one cycle; schedule it externally."
)]
pub struct Cli {
    /// Ticker to watch (overrides IPO_SYMBOL).
    #[arg(long, global = true)]
    pub symbol: Option<String>,

    /// State file path (overrides IPO_STATE_FILE).
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Per-source timeout in milliseconds (overrides IPO_REQUEST_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Dotenv file to load; a missing file is ignored.
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Check, compare, notify on change and persist.
    Run,
    /// Query the sources and print the aggregated result; needs no credentials.
    Check,
    /// Print the persisted state.
    State,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_run() {
        let cli = Cli::try_parse_from(["ipowatch"]).expect("must parse");
        assert_eq!(cli.command(), Command::Run);
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert!(!cli.pretty);
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "ipowatch",
            "check",
            "--symbol",
            "arm",
            "--timeout-ms",
            "2500",
            "--pretty",
        ])
        .expect("must parse");

        assert_eq!(cli.command(), Command::Check);
        assert_eq!(cli.symbol.as_deref(), Some("arm"));
        assert_eq!(cli.timeout_ms, Some(2500));
        assert!(cli.pretty);
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["ipowatch", "--timeout-ms", "soon"]).is_err());
    }
}
