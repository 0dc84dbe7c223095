mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    // Loaded before the subscriber so RUST_LOG may come from the file.
    let env_file_error = dotenvy::from_filename(&cli.env_file)
        .err()
        .filter(|error| !matches!(error, dotenvy::Error::Io(_)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ipowatch_core=info")),
        )
        .init();

    if let Some(error) = env_file_error {
        return Err(CliError::EnvFile {
            path: cli.env_file.clone(),
            message: error.to_string(),
        });
    }

    info!(command = ?cli.command(), "starting ipowatch");
    let value = commands::run(&cli).await?;
    output::render(&value, cli.pretty)?;

    Ok(ExitCode::SUCCESS)
}
