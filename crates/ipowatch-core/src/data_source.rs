//! Source adapter contract and its structured error.
//!
//! Every upstream that can say something about an IPO implements
//! [`StatusSource`]. Adapters are capability-equivalent: each answers the same
//! question for one ticker, and the aggregator decides whose answer wins.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{IpoInfo, ProviderId, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    Timeout,
    InvalidResponse,
    Internal,
}

/// Structured source error recorded by the aggregator before it moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the next scheduled run has a reasonable chance of succeeding.
    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<IpoInfo, SourceError>> + Send + 'a>>;

/// Read-only upstream that reports the status of one ticker.
///
/// `Ok` with [`IpoStatus::NotFound`](crate::IpoStatus::NotFound) means the
/// source answered but has nothing on the ticker; `Err` means it could not
/// answer at all. The aggregator treats both as "try the next source".
pub trait StatusSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a>;
}
