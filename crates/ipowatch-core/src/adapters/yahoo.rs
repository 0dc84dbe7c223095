use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::data_source::{FetchFuture, SourceError, StatusSource};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{IpoInfo, IpoStatus, ProviderId, StatusSignal, Symbol};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Live market data from Yahoo's chart endpoint.
///
/// A ticker with a positive regular-market price is trading; anything else
/// is reported as not found. This source outranks calendar listings because
/// a quote is the freshest evidence that shares are tradeable.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        )
    }

    async fn fetch_chart(&self, symbol: &Symbol) -> Result<IpoInfo, SourceError> {
        let request = HttpRequest::get(self.chart_url(symbol))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);
        debug!(url = %request.url, "querying yahoo chart");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(transport_error)?;

        parse_chart_response(symbol, &response)
    }
}

impl StatusSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a> {
        Box::pin(self.fetch_chart(symbol))
    }
}

fn transport_error(error: HttpError) -> SourceError {
    if error.timed_out() {
        SourceError::timeout(format!("yahoo transport timeout: {}", error.message()))
    } else {
        SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
    }
}

fn parse_chart_response(symbol: &Symbol, response: &HttpResponse) -> Result<IpoInfo, SourceError> {
    match response.status {
        404 => return Ok(not_listed(symbol)),
        429 => {
            return Err(SourceError::rate_limited("yahoo returned status 429"));
        }
        status if !(200..300).contains(&status) => {
            // Yahoo answers unknown tickers with an error body on several statuses.
            if let Ok(chart) = serde_json::from_str::<YahooChartResponse>(&response.body) {
                if chart.chart.error.as_ref().is_some_and(YahooChartError::is_no_data) {
                    return Ok(not_listed(symbol));
                }
            }
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {status}"
            )));
        }
        _ => {}
    }

    let chart: YahooChartResponse = serde_json::from_str(&response.body).map_err(|e| {
        SourceError::invalid_response(format!("failed to parse yahoo chart: {e}"))
    })?;

    if let Some(error) = &chart.chart.error {
        if error.is_no_data() {
            return Ok(not_listed(symbol));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    let Some(meta) = chart
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|result| result.meta)
    else {
        return Ok(not_listed(symbol));
    };

    // Yahoo silently substitutes a different instrument for some tickers.
    if !meta.symbol.as_deref().is_some_and(|reported| symbol.matches(reported)) {
        return Ok(not_listed(symbol));
    }

    let price = meta.regular_market_price;
    let status = IpoStatus::classify(&StatusSignal::Quote { price });
    let (IpoStatus::Trading, Some(price)) = (status, price) else {
        return Ok(not_listed(symbol));
    };

    let currency = meta.currency.unwrap_or_else(|| String::from("USD"));
    let exchange = meta.exchange_name;
    let details = format!(
        "Trading on {} at {currency} {price:.2}",
        exchange.as_deref().unwrap_or("an exchange")
    );

    IpoInfo::new(symbol.clone(), status, ProviderId::Yahoo)
        .with_price(price)
        .map(|info| {
            info.with_exchange(exchange)
                .with_company_name(meta.short_name.or(meta.long_name))
                .with_details(details)
        })
        .map_err(|e| SourceError::invalid_response(format!("yahoo price rejected: {e}")))
}

fn not_listed(symbol: &Symbol) -> IpoInfo {
    IpoInfo::new(symbol.clone(), IpoStatus::NotFound, ProviderId::Yahoo)
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: YahooChartMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooChartMeta {
    symbol: Option<String>,
    regular_market_price: Option<f64>,
    exchange_name: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: Option<String>,
    description: Option<String>,
}

impl YahooChartError {
    fn is_no_data(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|description| description.contains("No data found"))
            || self.code.as_deref() == Some("Not Found")
    }

    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(value), None) | (None, Some(value)) => value.clone(),
            (None, None) => String::from("unknown error"),
        }
    }
}
