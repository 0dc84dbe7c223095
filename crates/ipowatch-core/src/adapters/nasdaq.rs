use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::data_source::{FetchFuture, SourceError, StatusSource};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{CalendarSection, IpoInfo, IpoStatus, ProviderId, StatusSignal, Symbol};

const DEFAULT_CALENDAR_URL: &str = "https://api.nasdaq.com/api/ipo/calendar";

/// NASDAQ's public IPO calendar.
///
/// The section a ticker appears under decides its stage: filed deals are
/// upcoming, deals in the current upcoming table are taking subscriptions and
/// priced deals have closed their book.
#[derive(Clone)]
pub struct NasdaqCalendarAdapter {
    http_client: Arc<dyn HttpClient>,
    calendar_url: String,
    timeout_ms: u64,
}

impl NasdaqCalendarAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            calendar_url: String::from(DEFAULT_CALENDAR_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_calendar_url(mut self, calendar_url: impl Into<String>) -> Self {
        self.calendar_url = calendar_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_calendar(&self, symbol: &Symbol) -> Result<IpoInfo, SourceError> {
        let request = HttpRequest::get(self.calendar_url.as_str())
            .with_header("accept", "application/json")
            .with_header("user-agent", crate::http_client::BROWSER_USER_AGENT)
            .with_timeout_ms(self.timeout_ms);
        debug!(url = %request.url, "querying nasdaq ipo calendar");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(transport_error)?;

        parse_calendar_response(symbol, &response)
    }
}

impl StatusSource for NasdaqCalendarAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Nasdaq
    }

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a> {
        Box::pin(self.fetch_calendar(symbol))
    }
}

fn transport_error(error: HttpError) -> SourceError {
    if error.timed_out() {
        SourceError::timeout(format!("nasdaq transport timeout: {}", error.message()))
    } else {
        SourceError::unavailable(format!("nasdaq transport error: {}", error.message()))
    }
}

fn parse_calendar_response(
    symbol: &Symbol,
    response: &HttpResponse,
) -> Result<IpoInfo, SourceError> {
    if response.status == 429 {
        return Err(SourceError::rate_limited("nasdaq returned status 429"));
    }
    if !response.is_success() {
        return Err(SourceError::unavailable(format!(
            "nasdaq returned status {}",
            response.status
        )));
    }

    let calendar: NasdaqCalendarResponse = serde_json::from_str(&response.body).map_err(|e| {
        SourceError::invalid_response(format!("failed to parse nasdaq calendar: {e}"))
    })?;
    let data = calendar
        .data
        .ok_or_else(|| SourceError::invalid_response("nasdaq calendar response has no data"))?;

    for section in CalendarSection::SEARCH_ORDER {
        let Some(row) = data
            .section(section)
            .and_then(|mut rows| rows.find(|row| row.is_for(symbol)))
        else {
            continue;
        };

        let status = IpoStatus::classify(&StatusSignal::Calendar {
            section: section.as_str().to_owned(),
        });
        let exchange = row
            .proposed_exchange
            .clone()
            .or_else(|| Some(String::from("NASDAQ")));

        return Ok(IpoInfo::new(symbol.clone(), status, ProviderId::Nasdaq)
            .with_company_name(row.company_name.clone())
            .with_exchange(exchange)
            .with_listing_date(row.expected_price_date.clone().or(row.priced_date.clone()))
            .with_details(format!("Found in NASDAQ {} IPOs", section.as_str())));
    }

    Ok(IpoInfo::new(
        symbol.clone(),
        IpoStatus::NotFound,
        ProviderId::Nasdaq,
    ))
}

#[derive(Debug, Deserialize)]
struct NasdaqCalendarResponse {
    #[serde(default)]
    data: Option<NasdaqCalendarData>,
}

#[derive(Debug, Deserialize)]
struct NasdaqCalendarData {
    #[serde(default)]
    upcoming: Option<NasdaqSection>,
    #[serde(default)]
    priced: Option<NasdaqSection>,
    #[serde(default)]
    filed: Option<NasdaqSection>,
}

impl NasdaqCalendarData {
    fn section(&self, section: CalendarSection) -> Option<impl Iterator<Item = &NasdaqRow>> {
        let entry = match section {
            CalendarSection::Upcoming => self.upcoming.as_ref(),
            CalendarSection::Priced => self.priced.as_ref(),
            CalendarSection::Filed => self.filed.as_ref(),
        }?;
        Some(entry.rows())
    }
}

/// Rows sit either directly on the section or, for upcoming deals, inside
/// an `upcomingTable` wrapper.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NasdaqSection {
    #[serde(default)]
    rows: Option<Vec<NasdaqRow>>,
    #[serde(default)]
    upcoming_table: Option<NasdaqTable>,
}

impl NasdaqSection {
    fn rows(&self) -> impl Iterator<Item = &NasdaqRow> {
        let nested = self
            .upcoming_table
            .as_ref()
            .and_then(|table| table.rows.as_deref())
            .unwrap_or_default();
        self.rows.as_deref().unwrap_or_default().iter().chain(nested)
    }
}

#[derive(Debug, Deserialize)]
struct NasdaqTable {
    #[serde(default)]
    rows: Option<Vec<NasdaqRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NasdaqRow {
    proposed_ticker_symbol: Option<String>,
    company_name: Option<String>,
    proposed_exchange: Option<String>,
    expected_price_date: Option<String>,
    priced_date: Option<String>,
}

impl NasdaqRow {
    fn is_for(&self, symbol: &Symbol) -> bool {
        self.proposed_ticker_symbol
            .as_deref()
            .is_some_and(|ticker| symbol.matches(ticker))
    }
}
