//! # ipowatch Core
//!
//! Watches a single ticker's IPO lifecycle and announces status changes.
//!
//! ## Overview
//!
//! One invocation performs one cycle:
//!
//! - **Check**: ask each status source in priority order; first known status wins
//! - **Compare**: diff against the status persisted by the previous run
//! - **Notify**: send one Telegram message when the status moved to a known stage
//! - **Persist**: atomically record the new snapshot, whatever happened before
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart and NASDAQ IPO calendar sources |
//! | [`aggregator`] | Ordered fallback across sources |
//! | [`config`] | Explicit runtime configuration |
//! | [`data_source`] | Source trait and structured source errors |
//! | [`domain`] | Status model, snapshots, symbols, timestamps |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`monitor`] | The check-compare-notify-persist cycle |
//! | [`notifier`] | Transition messages and Telegram delivery |
//! | [`source`] | Provider identifiers |
//! | [`state`] | Persisted state file |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use ipowatch_core::{
//!     Config, Monitor, ReqwestHttpClient, StateStore, StatusAggregatorBuilder, TelegramNotifier,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let http = Arc::new(ReqwestHttpClient::new());
//!
//!     let monitor = Monitor::new(
//!         StatusAggregatorBuilder::from_config(&config)
//!             .with_http_client(http.clone())
//!             .build(),
//!         StateStore::new(&config.state_path),
//!         Arc::new(TelegramNotifier::new(config.telegram()?, http)),
//!     );
//!
//!     let report = monitor.run_once(&config.symbol).await;
//!     println!("{}", serde_json::to_string(&report)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Only configuration can fail a run. Source failures degrade to `NOT_FOUND`,
//! and notification or save failures are logged and carried in the
//! [`RunReport`]:
//!
//! ```rust
//! use ipowatch_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::RateLimited | SourceErrorKind::Timeout => "try again next run",
//!         _ => "next source",
//!     }
//! }
//!
//! assert_eq!(describe(&SourceError::rate_limited("429")), "try again next run");
//! ```
//!
//! ## Security
//!
//! - The bot token comes from configuration only and is redacted from
//!   `Debug` output, errors and logs

pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod monitor;
pub mod notifier;
pub mod source;
pub mod state;

// Adapter implementations
pub use adapters::{NasdaqCalendarAdapter, YahooAdapter};

// Aggregation
pub use aggregator::{CheckReport, SourceFailure, StatusAggregator, StatusAggregatorBuilder};

// Configuration
pub use config::{Config, ConfigError, TelegramConfig};

// Data source trait and types
pub use data_source::{FetchFuture, SourceError, SourceErrorKind, StatusSource};

// Domain models
pub use domain::{CalendarSection, IpoInfo, IpoStatus, StatusSignal, Symbol, UtcDateTime};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};

// Run cycle
pub use monitor::{
    decide, Decision, Monitor, NotifyOutcome, PersistOutcome, RunPhase, RunReport, SkipReason,
};

// Notification
pub use notifier::{format_transition, Notifier, NotifyError, NotifyFuture, TelegramNotifier};

// Source identifiers
pub use source::ProviderId;

// State
pub use state::{PersistedState, StateError, StateStore};
