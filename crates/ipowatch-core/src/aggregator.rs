//! Best-of-N status resolution.
//!
//! Sources are consulted one at a time in priority order and the first one
//! that reports a known status wins. Failures and "not found" answers are
//! recorded and the next source is tried; when nobody knows the ticker the
//! result is a `NotFound` snapshot with source `none`, never an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{NasdaqCalendarAdapter, YahooAdapter};
use crate::config::Config;
use crate::data_source::{SourceError, StatusSource};
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{IpoInfo, ProviderId, Symbol};

/// One source that could not answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: ProviderId,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl SourceFailure {
    fn new(source: ProviderId, error: &SourceError) -> Self {
        Self {
            source,
            code: error.code(),
            message: error.message().to_owned(),
            retryable: error.retryable(),
        }
    }
}

/// Outcome of one aggregated check, with the trail that led to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub info: IpoInfo,
    /// Sources consulted, in the order they were asked.
    pub source_chain: Vec<ProviderId>,
    /// Sources that answered but had nothing on the ticker.
    pub not_found: Vec<ProviderId>,
    pub failures: Vec<SourceFailure>,
    pub latency_ms: u64,
}

/// Ordered list of capability-equivalent sources.
pub struct StatusAggregator {
    sources: Vec<Arc<dyn StatusSource>>,
    source_timeout: Duration,
}

impl StatusAggregator {
    /// `sources` must already be in priority order, highest first.
    pub fn new(sources: Vec<Arc<dyn StatusSource>>) -> Self {
        Self {
            sources,
            source_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Upper bound on each individual source call.
    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    pub fn source_ids(&self) -> Vec<ProviderId> {
        self.sources.iter().map(|source| source.id()).collect()
    }

    pub async fn check(&self, symbol: &Symbol) -> IpoInfo {
        self.check_detailed(symbol).await.info
    }

    pub async fn check_detailed(&self, symbol: &Symbol) -> CheckReport {
        let started = Instant::now();
        let mut source_chain = Vec::with_capacity(self.sources.len());
        let mut not_found = Vec::new();
        let mut failures = Vec::new();

        for source in &self.sources {
            let provider = source.id();
            source_chain.push(provider);

            let outcome = match tokio::time::timeout(self.source_timeout, source.fetch(symbol)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(SourceError::timeout(format!(
                    "{provider} did not answer within {} ms",
                    self.source_timeout.as_millis()
                ))),
            };

            match outcome {
                Ok(info) if info.status.is_known() => {
                    info!(
                        symbol = %symbol,
                        source = %provider,
                        status = %info.status,
                        "source reported status"
                    );
                    return CheckReport {
                        info,
                        source_chain,
                        not_found,
                        failures,
                        latency_ms: elapsed_ms(started),
                    };
                }
                Ok(_) => {
                    info!(symbol = %symbol, source = %provider, "source has no data for ticker");
                    not_found.push(provider);
                }
                Err(error) => {
                    warn!(
                        symbol = %symbol,
                        source = %provider,
                        code = error.code(),
                        "source check failed: {}",
                        error.message()
                    );
                    failures.push(SourceFailure::new(provider, &error));
                }
            }
        }

        info!(
            symbol = %symbol,
            failed = failures.len(),
            "no source reported a status; treating ticker as not found"
        );
        CheckReport {
            info: IpoInfo::not_found(symbol.clone()),
            source_chain,
            not_found,
            failures,
            latency_ms: elapsed_ms(started),
        }
    }
}

/// Builds the production source chain.
///
/// Yahoo comes first: a live quote is the only evidence of `TRADING` and is
/// fresher than any calendar. The NASDAQ calendar covers the pre-listing
/// stages.
pub struct StatusAggregatorBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    timeout: Option<Duration>,
    enable_yahoo: bool,
    enable_nasdaq: bool,
}

impl StatusAggregatorBuilder {
    pub fn new() -> Self {
        Self {
            http_client: None,
            timeout: None,
            enable_yahoo: true,
            enable_nasdaq: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new().with_timeout(config.request_timeout)
    }

    /// Shares one transport between all sources instead of a fresh reqwest client.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_yahoo_enabled(mut self, enabled: bool) -> Self {
        self.enable_yahoo = enabled;
        self
    }

    pub fn with_nasdaq_enabled(mut self, enabled: bool) -> Self {
        self.enable_nasdaq = enabled;
        self
    }

    pub fn build(self) -> StatusAggregator {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS));
        let timeout_ms = timeout.as_millis().min(u128::from(u64::MAX)) as u64;

        let mut sources: Vec<Arc<dyn StatusSource>> = Vec::new();
        if self.enable_yahoo {
            sources.push(Arc::new(
                YahooAdapter::new(http_client.clone()).with_timeout_ms(timeout_ms),
            ));
        }
        if self.enable_nasdaq {
            sources.push(Arc::new(
                NasdaqCalendarAdapter::new(http_client).with_timeout_ms(timeout_ms),
            ));
        }

        // The transport enforces the timeout; the outer bound catches bodies
        // that trickle in after the headers.
        StatusAggregator::new(sources).with_source_timeout(timeout + Duration::from_secs(1))
    }
}

impl Default for StatusAggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::FetchFuture;
    use crate::IpoStatus;

    struct FixedSource {
        id: ProviderId,
        outcome: Result<IpoStatus, SourceError>,
    }

    impl StatusSource for FixedSource {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a> {
            let outcome = self
                .outcome
                .clone()
                .map(|status| IpoInfo::new(symbol.clone(), status, self.id));
            Box::pin(async move { outcome })
        }
    }

    fn source(id: ProviderId, outcome: Result<IpoStatus, SourceError>) -> Arc<dyn StatusSource> {
        Arc::new(FixedSource { id, outcome })
    }

    fn symbol() -> Symbol {
        Symbol::parse("KLAR").expect("valid symbol")
    }

    #[tokio::test]
    async fn first_known_status_wins_even_if_later_is_further_along() {
        let aggregator = StatusAggregator::new(vec![
            source(ProviderId::Nasdaq, Ok(IpoStatus::Upcoming)),
            source(ProviderId::Yahoo, Ok(IpoStatus::Trading)),
        ]);

        let report = aggregator.check_detailed(&symbol()).await;

        assert_eq!(report.info.status, IpoStatus::Upcoming);
        assert_eq!(report.info.source, ProviderId::Nasdaq);
        assert_eq!(report.source_chain, vec![ProviderId::Nasdaq]);
    }

    #[tokio::test]
    async fn not_found_and_failures_fall_through() {
        let aggregator = StatusAggregator::new(vec![
            source(ProviderId::Yahoo, Err(SourceError::rate_limited("429"))),
            source(ProviderId::Nasdaq, Ok(IpoStatus::NotFound)),
        ]);

        let report = aggregator.check_detailed(&symbol()).await;

        assert_eq!(report.info.status, IpoStatus::NotFound);
        assert_eq!(report.info.source, ProviderId::Unresolved);
        assert_eq!(report.source_chain, vec![ProviderId::Yahoo, ProviderId::Nasdaq]);
        assert_eq!(report.not_found, vec![ProviderId::Nasdaq]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].code, "source.rate_limited");
    }

    #[tokio::test]
    async fn empty_chain_degrades_to_not_found() {
        let info = StatusAggregator::new(Vec::new()).check(&symbol()).await;
        assert_eq!(info.status, IpoStatus::NotFound);
        assert_eq!(info.source, ProviderId::Unresolved);
    }

    #[test]
    fn builder_orders_market_data_before_calendar() {
        let aggregator = StatusAggregatorBuilder::new().build();
        assert_eq!(
            aggregator.source_ids(),
            vec![ProviderId::Yahoo, ProviderId::Nasdaq]
        );

        let calendar_only = StatusAggregatorBuilder::new()
            .with_yahoo_enabled(false)
            .build();
        assert_eq!(calendar_only.source_ids(), vec![ProviderId::Nasdaq]);
    }
}
