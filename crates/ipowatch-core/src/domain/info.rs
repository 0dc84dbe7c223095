use serde::{Deserialize, Serialize};

use crate::{IpoStatus, ProviderId, Symbol, UtcDateTime, ValidationError};

/// Snapshot of one IPO produced by a single check.
///
/// Plain value: two snapshots with equal fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpoInfo {
    pub symbol: Symbol,
    pub status: IpoStatus,
    pub price: Option<f64>,
    pub exchange: Option<String>,
    pub company_name: Option<String>,
    pub listing_date: Option<String>,
    pub details: Option<String>,
    pub source: ProviderId,
    pub timestamp: UtcDateTime,
}

impl IpoInfo {
    pub fn new(symbol: Symbol, status: IpoStatus, source: ProviderId) -> Self {
        Self {
            symbol,
            status,
            price: None,
            exchange: None,
            company_name: None,
            listing_date: None,
            details: None,
            source,
            timestamp: UtcDateTime::now(),
        }
    }

    /// The "no source knows about this ticker yet" snapshot.
    pub fn not_found(symbol: Symbol) -> Self {
        Self::new(symbol, IpoStatus::NotFound, ProviderId::Unresolved)
    }

    pub fn with_price(mut self, price: f64) -> Result<Self, ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        if price < 0.0 {
            return Err(ValidationError::NegativeValue { field: "price" });
        }
        self.price = Some(price);
        Ok(self)
    }

    pub fn with_exchange(mut self, exchange: Option<String>) -> Self {
        self.exchange = non_blank(exchange);
        self
    }

    pub fn with_company_name(mut self, company_name: Option<String>) -> Self {
        self.company_name = non_blank(company_name);
        self
    }

    pub fn with_listing_date(mut self, listing_date: Option<String>) -> Self {
        self.listing_date = non_blank(listing_date);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = non_blank(Some(details.into()));
        self
    }

    pub fn with_timestamp(mut self, timestamp: UtcDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_tradeable(&self) -> bool {
        self.status.is_tradeable()
    }

    pub fn is_actionable(&self) -> bool {
        self.status.is_actionable()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
