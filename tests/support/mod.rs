//! Fakes shared by the behaviour tests: a URL-routed HTTP client, fixed
//! sources and a recording notifier. Nothing here touches the network.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ipowatch_core::{
    FetchFuture, HttpClient, HttpError, HttpRequest, HttpResponse, IpoInfo, IpoStatus, Notifier,
    NotifyError, NotifyFuture, ProviderId, SourceError, StatusSource, Symbol,
};

/// Answers by the first route whose pattern occurs in the request URL.
#[derive(Default)]
pub struct RoutedHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RoutedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .push((pattern.to_owned(), Ok(HttpResponse::new(status, body))));
        self
    }

    pub fn fail(mut self, pattern: &str, error: HttpError) -> Self {
        self.routes.push((pattern.to_owned(), Err(error)));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn requests_to(&self, pattern: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.contains(pattern))
            .count()
    }
}

impl HttpClient for RoutedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .routes
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Err(HttpError::new(format!("no route for {}", request.url))));
        self.requests.lock().expect("request log").push(request);
        Box::pin(async move { response })
    }
}

/// Source with a canned answer, optionally after a delay.
pub struct FixedSource {
    id: ProviderId,
    outcome: Result<IpoStatus, SourceError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn reporting(id: ProviderId, status: IpoStatus) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome: Ok(status),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(id: ProviderId, error: SourceError) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn hanging(id: ProviderId, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome: Ok(IpoStatus::Trading),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatusSource for FixedSource {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome
                .clone()
                .map(|status| IpoInfo::new(symbol.clone(), status, self.id))
        })
    }
}

/// Records every transition it is asked to announce.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(IpoInfo, IpoInfo)>>,
    failure: Option<NotifyError>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_with(failure: NotifyError) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(failure),
        })
    }

    pub fn sent(&self) -> Vec<(IpoInfo, IpoInfo)> {
        self.sent.lock().expect("sent log").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify<'a>(&'a self, previous: &'a IpoInfo, current: &'a IpoInfo) -> NotifyFuture<'a> {
        self.sent
            .lock()
            .expect("sent log")
            .push((previous.clone(), current.clone()));
        let outcome = match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        };
        Box::pin(async move { outcome })
    }
}

pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

pub fn yahoo_quote(ticker: &str, price: f64) -> String {
    format!(
        r#"{{"chart":{{"result":[{{"meta":{{"symbol":"{ticker}","regularMarketPrice":{price},"currency":"USD","exchangeName":"NYQ","shortName":"{ticker} Holdings"}}}}],"error":null}}}}"#
    )
}

pub fn yahoo_no_data() -> &'static str {
    r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#
}

/// NASDAQ calendar listing `ticker` under `section` and nothing elsewhere.
pub fn nasdaq_calendar(section: &str, ticker: &str) -> String {
    let row = format!(
        r#"{{"proposedTickerSymbol":"{ticker}","companyName":"{ticker} Group plc","proposedExchange":"NYSE","expectedPriceDate":"09/10/2026"}}"#
    );
    let body = match section {
        "upcoming" => format!(r#"{{"upcoming":{{"upcomingTable":{{"rows":[{row}]}}}}}}"#),
        other => format!(r#"{{"{other}":{{"rows":[{row}]}}}}"#),
    };
    format!(r#"{{"data":{body}}}"#)
}

pub fn empty_nasdaq_calendar() -> &'static str {
    r#"{"data":{"upcoming":{"upcomingTable":{"rows":[]}},"priced":{"rows":[]},"filed":{"rows":[]}}}"#
}
