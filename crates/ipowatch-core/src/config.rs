//! Run configuration, read once at process start.
//!
//! Components take the pieces they need through their constructors; none of
//! them reads the environment on its own.
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | `TELEGRAM_BOT_TOKEN` | required to notify | bot credential |
//! | `TELEGRAM_CHAT_ID` | required to notify | destination chat |
//! | `TELEGRAM_API_BASE` | `https://api.telegram.org` | bot API endpoint |
//! | `IPO_SYMBOL` | [`DEFAULT_SYMBOL`] | ticker to monitor |
//! | `IPO_STATE_FILE` | `ipo_state.json` | persisted state |
//! | `IPO_REQUEST_TIMEOUT_MS` | `15000` | per-source timeout |

use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::{Symbol, ValidationError};

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_TELEGRAM_API_BASE: &str = "TELEGRAM_API_BASE";
pub const ENV_SYMBOL: &str = "IPO_SYMBOL";
pub const ENV_STATE_FILE: &str = "IPO_STATE_FILE";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "IPO_REQUEST_TIMEOUT_MS";

pub const DEFAULT_SYMBOL: &str = "KLAR";
pub const DEFAULT_STATE_FILE: &str = "ipo_state.json";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid {key}: {source}")]
    InvalidSymbol {
        key: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Destination for outbound alerts.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl Debug for TelegramConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct Config {
    pub symbol: Symbol,
    pub state_path: PathBuf,
    pub request_timeout: Duration,
    bot_token: Option<String>,
    chat_id: Option<String>,
    telegram_api_base: String,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("symbol", &self.symbol)
            .field("state_path", &self.state_path)
            .field("request_timeout", &self.request_timeout)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("telegram_api_base", &self.telegram_api_base)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value lookup. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let symbol = match get(ENV_SYMBOL) {
            Some(raw) => Symbol::parse(&raw).map_err(|source| ConfigError::InvalidSymbol {
                key: ENV_SYMBOL,
                source,
            })?,
            None => Symbol::parse(DEFAULT_SYMBOL).map_err(|source| {
                ConfigError::InvalidSymbol {
                    key: ENV_SYMBOL,
                    source,
                }
            })?,
        };

        let request_timeout = match get(ENV_REQUEST_TIMEOUT_MS) {
            Some(raw) => parse_timeout_ms(ENV_REQUEST_TIMEOUT_MS, &raw)?,
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        Ok(Self {
            symbol,
            state_path: get(ENV_STATE_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            request_timeout,
            bot_token: get(ENV_BOT_TOKEN),
            chat_id: get(ENV_CHAT_ID),
            telegram_api_base: get(ENV_TELEGRAM_API_BASE)
                .unwrap_or_else(|| String::from(DEFAULT_TELEGRAM_API_BASE)),
        })
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn with_state_path(mut self, state_path: impl Into<PathBuf>) -> Self {
        self.state_path = state_path.into();
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn request_timeout_ms(&self) -> u64 {
        self.request_timeout.as_millis().min(u128::from(u64::MAX)) as u64
    }

    /// Notifier settings; both the credential and the destination must be set.
    pub fn telegram(&self) -> Result<TelegramConfig, ConfigError> {
        let bot_token = self
            .bot_token
            .clone()
            .ok_or(ConfigError::Missing(ENV_BOT_TOKEN))?;
        let chat_id = self
            .chat_id
            .clone()
            .ok_or(ConfigError::Missing(ENV_CHAT_ID))?;

        Ok(TelegramConfig {
            bot_token,
            chat_id,
            api_base: self.telegram_api_base.trim_end_matches('/').to_owned(),
        })
    }
}

/// Parses a millisecond timeout, rejecting zero.
pub fn parse_timeout_ms(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).expect("defaults are valid");
        assert_eq!(config.symbol.as_str(), DEFAULT_SYMBOL);
        assert_eq!(config.state_path, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(config.request_timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn missing_credential_is_reported_by_name() {
        let config = config(&[(ENV_CHAT_ID, "-100123")]).expect("valid config");
        assert_eq!(config.telegram(), Err(ConfigError::Missing(ENV_BOT_TOKEN)));

        let config = self::config(&[(ENV_BOT_TOKEN, "123:abc"), (ENV_CHAT_ID, "  ")])
            .expect("valid config");
        assert_eq!(config.telegram(), Err(ConfigError::Missing(ENV_CHAT_ID)));
    }

    #[test]
    fn telegram_settings_are_assembled() {
        let config = config(&[
            (ENV_BOT_TOKEN, "123:abc"),
            (ENV_CHAT_ID, "-100123"),
            (ENV_TELEGRAM_API_BASE, "http://localhost:8081/"),
            (ENV_SYMBOL, " arm "),
        ])
        .expect("valid config");

        let telegram = config.telegram().expect("complete telegram settings");
        assert_eq!(telegram.api_base, "http://localhost:8081");
        assert_eq!(config.symbol.as_str(), "ARM");
        assert!(!format!("{telegram:?}").contains("123:abc"));
        assert!(!format!("{config:?}").contains("123:abc"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config(&[(ENV_SYMBOL, "$$$")]),
            Err(ConfigError::InvalidSymbol { .. })
        ));
        assert!(matches!(
            config(&[(ENV_REQUEST_TIMEOUT_MS, "0")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
