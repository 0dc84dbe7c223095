use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
///
/// Only failures before the cycle starts end up here; a completed `run`
/// exits 0 even when delivery or the state write failed.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ipowatch_core::ConfigError),

    #[error("failed to load env file {}: {message}", .path.display())]
    EnvFile { path: PathBuf, message: String },

    #[error(transparent)]
    Validation(#[from] ipowatch_core::ValidationError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    State(#[from] ipowatch_core::StateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::EnvFile { .. } => 2,
            Self::Validation(_) => 2,
            Self::Serialization(_) => 4,
            Self::State(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_problems_exit_with_two() {
        let missing = CliError::from(ipowatch_core::ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
        assert_eq!(missing.exit_code(), 2);
        assert!(missing.to_string().contains("TELEGRAM_BOT_TOKEN"));

        let invalid = CliError::from(ipowatch_core::ValidationError::EmptySymbol);
        assert_eq!(invalid.exit_code(), 2);
    }

    #[test]
    fn io_problems_exit_with_ten() {
        let error = CliError::from(std::io::Error::other("disk full"));
        assert_eq!(error.exit_code(), 10);
    }
}
