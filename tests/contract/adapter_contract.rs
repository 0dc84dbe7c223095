#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use ipowatch_core::{
    HttpClient, HttpError, IpoStatus, NasdaqCalendarAdapter, ProviderId, SourceErrorKind,
    StatusSource, YahooAdapter,
};

use support::{
    empty_nasdaq_calendar, nasdaq_calendar, symbol, yahoo_no_data, yahoo_quote, RoutedHttpClient,
};

struct AdapterCase {
    id: ProviderId,
    /// URL fragment the adapter requests.
    endpoint: &'static str,
    known_body: String,
    known_status: IpoStatus,
    unknown_body: String,
}

fn adapter_cases() -> Vec<AdapterCase> {
    vec![
        AdapterCase {
            id: ProviderId::Yahoo,
            endpoint: "finance/chart/",
            known_body: yahoo_quote("KLAR", 40.0),
            known_status: IpoStatus::Trading,
            unknown_body: yahoo_no_data().to_owned(),
        },
        AdapterCase {
            id: ProviderId::Nasdaq,
            endpoint: "api/ipo/calendar",
            known_body: nasdaq_calendar("filed", "KLAR"),
            known_status: IpoStatus::Upcoming,
            unknown_body: empty_nasdaq_calendar().to_owned(),
        },
    ]
}

fn adapter(id: ProviderId, http: Arc<dyn HttpClient>) -> Arc<dyn StatusSource> {
    match id {
        ProviderId::Yahoo => Arc::new(YahooAdapter::new(http)),
        ProviderId::Nasdaq => Arc::new(NasdaqCalendarAdapter::new(http)),
        ProviderId::Unresolved => panic!("no adapter for unresolved source"),
    }
}

#[tokio::test]
async fn known_ticker_is_reported_with_adapter_identity() {
    for case in adapter_cases() {
        let http = Arc::new(RoutedHttpClient::new().route(case.endpoint, 200, case.known_body));
        let source = adapter(case.id, http.clone());

        let info = source
            .fetch(&symbol("klar"))
            .await
            .unwrap_or_else(|error| panic!("{}: fetch failed: {error}", case.id));

        assert_eq!(source.id(), case.id);
        assert_eq!(info.symbol.as_str(), "KLAR", "{}: symbol", case.id);
        assert_eq!(info.status, case.known_status, "{}: status", case.id);
        assert_eq!(info.source, case.id, "{}: source", case.id);
        assert!(info.exchange.is_some(), "{}: exchange", case.id);
        assert_eq!(http.requests().len(), 1, "{}: one request per fetch", case.id);
    }
}

#[tokio::test]
async fn unknown_ticker_is_not_found_rather_than_an_error() {
    for case in adapter_cases() {
        let http = Arc::new(RoutedHttpClient::new().route(case.endpoint, 200, case.unknown_body));

        let info = adapter(case.id, http)
            .fetch(&symbol("KLAR"))
            .await
            .unwrap_or_else(|error| panic!("{}: fetch failed: {error}", case.id));

        assert_eq!(info.status, IpoStatus::NotFound, "{}", case.id);
        assert_eq!(info.price, None, "{}", case.id);
    }
}

#[tokio::test]
async fn rate_limiting_is_a_retryable_error() {
    for case in adapter_cases() {
        let http = Arc::new(RoutedHttpClient::new().route(case.endpoint, 429, "Too Many Requests"));

        let error = adapter(case.id, http)
            .fetch(&symbol("KLAR"))
            .await
            .expect_err("429 must fail");

        assert_eq!(error.kind(), SourceErrorKind::RateLimited, "{}", case.id);
        assert!(error.retryable(), "{}", case.id);
    }
}

#[tokio::test]
async fn malformed_body_is_an_invalid_response() {
    for case in adapter_cases() {
        let http = Arc::new(RoutedHttpClient::new().route(case.endpoint, 200, "<html>captcha</html>"));

        let error = adapter(case.id, http)
            .fetch(&symbol("KLAR"))
            .await
            .expect_err("html must fail");

        assert_eq!(error.kind(), SourceErrorKind::InvalidResponse, "{}", case.id);
        assert!(!error.retryable(), "{}", case.id);
    }
}

#[tokio::test]
async fn transport_timeout_maps_to_timeout_kind() {
    for case in adapter_cases() {
        let http =
            Arc::new(RoutedHttpClient::new().fail(case.endpoint, HttpError::timeout("deadline")));

        let error = adapter(case.id, http)
            .fetch(&symbol("KLAR"))
            .await
            .expect_err("timeout must fail");

        assert_eq!(error.kind(), SourceErrorKind::Timeout, "{}", case.id);
        assert!(error.code().starts_with("source."), "{}", case.id);
    }
}
