//! Single-record state persisted between runs.
//!
//! The file is pretty-printed JSON:
//!
//! ```json
//! {
//!   "symbol": "KLAR",
//!   "status": "subscription_open",
//!   "price": null,
//!   "exchange": "NYSE",
//!   "company_name": "Klarna Group plc",
//!   "listing_date": "09/10/2026",
//!   "details": "Found in NASDAQ upcoming IPOs",
//!   "source": "nasdaq",
//!   "timestamp": "2026-09-08T13:05:00Z",
//!   "updated_at": "2026-09-08T13:05:01Z"
//! }
//! ```
//!
//! `symbol: null` means no snapshot was ever recorded.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{IpoInfo, IpoStatus, ProviderId, Symbol, UtcDateTime, ValidationError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("state file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to write state file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What the previous run left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub status: IpoStatus,
    /// Last observed snapshot, used to describe the next transition.
    pub snapshot: Option<IpoInfo>,
    pub updated_at: Option<UtcDateTime>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::initial()
    }
}

impl PersistedState {
    /// State before the first run: nothing known about any ticker.
    pub fn initial() -> Self {
        Self {
            status: IpoStatus::NotFound,
            snapshot: None,
            updated_at: None,
        }
    }

    pub fn from_snapshot(snapshot: IpoInfo) -> Self {
        Self {
            status: snapshot.status,
            snapshot: Some(snapshot),
            updated_at: None,
        }
    }

    /// The snapshot to compare `symbol` against.
    ///
    /// A record written for another ticker says nothing about this one, so
    /// it is treated like the initial state.
    pub fn previous_for(&self, symbol: &Symbol) -> IpoInfo {
        match &self.snapshot {
            Some(snapshot) if snapshot.symbol == *symbol => snapshot.clone(),
            Some(snapshot) => {
                warn!(
                    stored = %snapshot.symbol,
                    monitored = %symbol,
                    "state file belongs to another ticker; starting from scratch"
                );
                IpoInfo::not_found(symbol.clone())
            }
            None => {
                let mut previous = IpoInfo::not_found(symbol.clone());
                previous.status = self.status;
                previous
            }
        }
    }
}

/// File-backed store for [`PersistedState`].
///
/// Writes go to a temporary file in the same directory that is then renamed
/// over the target, so a reader sees either the old or the new record.
/// Callers guarantee a single writer.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record, falling back to [`PersistedState::initial`] when the
    /// file is absent or unreadable. Never fails the run.
    pub fn load(&self) -> PersistedState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!(path = %self.path.display(), "no state file yet; using initial state");
                PersistedState::initial()
            }
            Err(error) => {
                warn!("{error}; using initial state");
                PersistedState::initial()
            }
        }
    }

    /// Like [`load`](Self::load) but surfaces why a record could not be used.
    pub fn try_load(&self) -> Result<Option<PersistedState>, StateError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let corrupt = |reason: String| StateError::Corrupt {
            path: self.path.clone(),
            reason,
        };
        let document: StateDocument =
            serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;
        let state = PersistedState::try_from(document).map_err(|e| corrupt(e.to_string()))?;

        debug!(path = %self.path.display(), status = %state.status, "loaded state");
        Ok(Some(state))
    }

    /// Atomically replaces the record, stamping `updated_at` with now.
    pub fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let document = StateDocument::from_state(state, UtcDateTime::now());
        let encoded = serde_json::to_vec_pretty(&document)?;

        let write_error = |source: io::Error| StateError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_error)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
        temp.write_all(&encoded).map_err(write_error)?;
        temp.write_all(b"\n").map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(&self.path)
            .map_err(|error| write_error(error.error))?;

        debug!(path = %self.path.display(), status = %state.status, "saved state");
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    symbol: Option<Symbol>,
    status: IpoStatus,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    listing_date: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default = "unresolved_source")]
    source: ProviderId,
    #[serde(default)]
    timestamp: Option<UtcDateTime>,
    #[serde(default)]
    updated_at: Option<UtcDateTime>,
}

fn unresolved_source() -> ProviderId {
    ProviderId::Unresolved
}

impl StateDocument {
    fn from_state(state: &PersistedState, updated_at: UtcDateTime) -> Self {
        let snapshot = state.snapshot.as_ref();
        Self {
            symbol: snapshot.map(|info| info.symbol.clone()),
            status: state.status,
            price: snapshot.and_then(|info| info.price),
            exchange: snapshot.and_then(|info| info.exchange.clone()),
            company_name: snapshot.and_then(|info| info.company_name.clone()),
            listing_date: snapshot.and_then(|info| info.listing_date.clone()),
            details: snapshot.and_then(|info| info.details.clone()),
            source: snapshot.map_or(ProviderId::Unresolved, |info| info.source),
            timestamp: snapshot.map(|info| info.timestamp),
            updated_at: Some(updated_at),
        }
    }
}

impl TryFrom<StateDocument> for PersistedState {
    type Error = ValidationError;

    fn try_from(document: StateDocument) -> Result<Self, Self::Error> {
        let snapshot = match document.symbol {
            Some(symbol) => {
                let mut info = IpoInfo::new(symbol, document.status, document.source)
                    .with_exchange(document.exchange)
                    .with_company_name(document.company_name)
                    .with_listing_date(document.listing_date);
                if let Some(details) = document.details {
                    info = info.with_details(details);
                }
                if let Some(price) = document.price {
                    info = info.with_price(price)?;
                }
                if let Some(timestamp) = document.timestamp.or(document.updated_at) {
                    info = info.with_timestamp(timestamp);
                }
                Some(info)
            }
            None => None,
        };

        Ok(Self {
            status: document.status,
            snapshot,
            updated_at: document.updated_at,
        })
    }
}
