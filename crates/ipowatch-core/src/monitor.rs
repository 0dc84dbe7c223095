//! One check-compare-notify-persist cycle.
//!
//! ```text
//! START -> CHECKED -> COMPARED -> NOTIFIED | SKIPPED -> PERSISTED -> END
//! ```
//!
//! The new snapshot is persisted whatever happened on the notify branch, so a
//! failed delivery is not retried and the transition is not replayed on the
//! next run.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::aggregator::{CheckReport, StatusAggregator};
use crate::notifier::Notifier;
use crate::state::{PersistedState, StateStore};
use crate::{IpoStatus, Symbol};

/// Position in the per-run state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Start,
    Checked,
    Compared,
    Notified,
    Skipped,
    Persisted,
    End,
}

impl RunPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Checked => "CHECKED",
            Self::Compared => "COMPARED",
            Self::Notified => "NOTIFIED",
            Self::Skipped => "SKIPPED",
            Self::Persisted => "PERSISTED",
            Self::End => "END",
        }
    }
}

impl Display for RunPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unchanged,
    NotFound,
}

/// Result of the COMPARED step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Notify,
    Skip(SkipReason),
}

/// Alert iff the status moved and the new one is known.
///
/// Leaving `NOT_FOUND` is worth a message (first detection); entering it is not.
pub fn decide(previous: IpoStatus, current: IpoStatus) -> Decision {
    if current == previous {
        Decision::Skip(SkipReason::Unchanged)
    } else if current == IpoStatus::NotFound {
        Decision::Skip(SkipReason::NotFound)
    } else {
        Decision::Notify
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifyOutcome {
    Sent,
    Failed { code: &'static str, message: String },
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PersistOutcome {
    Saved,
    Failed { message: String },
}

/// Everything one run observed and did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub symbol: Symbol,
    pub previous_status: IpoStatus,
    pub check: CheckReport,
    pub notification: NotifyOutcome,
    pub persistence: PersistOutcome,
}

impl RunReport {
    pub fn current_status(&self) -> IpoStatus {
        self.check.info.status
    }

    /// Neither delivery nor the state write failed.
    pub fn is_clean(&self) -> bool {
        !matches!(self.notification, NotifyOutcome::Failed { .. })
            && matches!(self.persistence, PersistOutcome::Saved)
    }
}

pub struct Monitor {
    aggregator: StatusAggregator,
    store: StateStore,
    notifier: Arc<dyn Notifier>,
}

impl Monitor {
    pub fn new(aggregator: StatusAggregator, store: StateStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            aggregator,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Runs the full cycle once. Failures past configuration are reported in
    /// the returned [`RunReport`], never as an error.
    pub async fn run_once(&self, symbol: &Symbol) -> RunReport {
        enter(RunPhase::Start, symbol);

        let check = self.aggregator.check_detailed(symbol).await;
        let current = &check.info;
        info!(
            symbol = %symbol,
            phase = %RunPhase::Checked,
            status = %current.status,
            source = %current.source,
            latency_ms = check.latency_ms,
            "status checked"
        );

        let previous = self.store.load().previous_for(symbol);
        let decision = decide(previous.status, current.status);
        info!(
            symbol = %symbol,
            phase = %RunPhase::Compared,
            previous = %previous.status,
            current = %current.status,
            ?decision,
            "compared with stored state"
        );

        let notification = match decision {
            Decision::Notify => match self.notifier.notify(&previous, current).await {
                Ok(()) => {
                    enter(RunPhase::Notified, symbol);
                    NotifyOutcome::Sent
                }
                Err(failure) => {
                    error!(
                        symbol = %symbol,
                        phase = %RunPhase::Notified,
                        code = failure.code(),
                        "notification failed: {failure}"
                    );
                    NotifyOutcome::Failed {
                        code: failure.code(),
                        message: failure.to_string(),
                    }
                }
            },
            Decision::Skip(reason) => {
                info!(symbol = %symbol, phase = %RunPhase::Skipped, ?reason, "no notification");
                NotifyOutcome::Skipped { reason }
            }
        };

        let persistence = match self
            .store
            .save(&PersistedState::from_snapshot(current.clone()))
        {
            Ok(()) => {
                enter(RunPhase::Persisted, symbol);
                PersistOutcome::Saved
            }
            Err(failure) => {
                error!(symbol = %symbol, phase = %RunPhase::Persisted, "state save failed: {failure}");
                PersistOutcome::Failed {
                    message: failure.to_string(),
                }
            }
        };

        enter(RunPhase::End, symbol);
        RunReport {
            symbol: symbol.clone(),
            previous_status: previous.status,
            check,
            notification,
            persistence,
        }
    }
}

fn enter(phase: RunPhase, symbol: &Symbol) {
    info!(symbol = %symbol, phase = %phase, "run phase");
}
