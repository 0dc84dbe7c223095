use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Lifecycle stage of an IPO, loosely ordered by progression.
///
/// Regressions between runs are legal observations; nothing here enforces
/// monotonic movement through the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpoStatus {
    #[default]
    NotFound,
    Upcoming,
    SubscriptionOpen,
    SubscriptionClosed,
    AllotmentPending,
    AllotmentDone,
    Listed,
    Trading,
}

impl IpoStatus {
    pub const ALL: [Self; 8] = [
        Self::NotFound,
        Self::Upcoming,
        Self::SubscriptionOpen,
        Self::SubscriptionClosed,
        Self::AllotmentPending,
        Self::AllotmentDone,
        Self::Listed,
        Self::Trading,
    ];

    /// Persisted spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Upcoming => "upcoming",
            Self::SubscriptionOpen => "subscription_open",
            Self::SubscriptionClosed => "subscription_closed",
            Self::AllotmentPending => "allotment_pending",
            Self::AllotmentDone => "allotment_done",
            Self::Listed => "listed",
            Self::Trading => "trading",
        }
    }

    /// Spelling used in transition text, e.g. `SUBSCRIPTION_OPEN`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Upcoming => "UPCOMING",
            Self::SubscriptionOpen => "SUBSCRIPTION_OPEN",
            Self::SubscriptionClosed => "SUBSCRIPTION_CLOSED",
            Self::AllotmentPending => "ALLOTMENT_PENDING",
            Self::AllotmentDone => "ALLOTMENT_DONE",
            Self::Listed => "LISTED",
            Self::Trading => "TRADING",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::Upcoming => "Upcoming",
            Self::SubscriptionOpen => "Subscription Open",
            Self::SubscriptionClosed => "Subscription Closed",
            Self::AllotmentPending => "Allotment Pending",
            Self::AllotmentDone => "Allotment Complete",
            Self::Listed => "Listed",
            Self::Trading => "Trading",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::NotFound => "🔍",
            Self::Upcoming => "📅",
            Self::SubscriptionOpen => "📝",
            Self::SubscriptionClosed => "🔒",
            Self::AllotmentPending => "⏳",
            Self::AllotmentDone => "✅",
            Self::Listed => "🎉",
            Self::Trading => "📈",
        }
    }

    /// Shares can be bought on an exchange.
    pub const fn is_tradeable(self) -> bool {
        matches!(self, Self::Listed | Self::Trading)
    }

    /// Stages an investor would act on: subscribing, checking allotment, buying.
    pub const fn is_actionable(self) -> bool {
        matches!(
            self,
            Self::SubscriptionOpen | Self::AllotmentDone | Self::Listed | Self::Trading
        )
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// Maps a raw upstream signal onto exactly one status.
    ///
    /// Total: anything without a positive match is `NotFound`.
    pub fn classify(signal: &StatusSignal) -> Self {
        match signal {
            StatusSignal::Quote { price } => match price {
                Some(price) if price.is_finite() && *price > 0.0 => Self::Trading,
                _ => Self::NotFound,
            },
            StatusSignal::Calendar { section } => CalendarSection::from_name(section)
                .map(CalendarSection::status)
                .unwrap_or(Self::NotFound),
            StatusSignal::Label(text) => Self::from_label(text).unwrap_or(Self::NotFound),
            StatusSignal::Unparseable => Self::NotFound,
        }
    }

    fn from_label(text: &str) -> Option<Self> {
        let normalized = text
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|status| {
            status.as_str() == normalized
                || status.label().to_ascii_lowercase().replace(' ', "_") == normalized
        })
    }
}

impl Display for IpoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for IpoStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value).ok_or_else(|| ValidationError::InvalidStatus {
            value: value.to_owned(),
        })
    }
}

/// Raw evidence handed over by a source for classification.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusSignal {
    /// Live market data for the ticker, if any was returned.
    Quote { price: Option<f64> },
    /// The IPO calendar section the ticker was listed under.
    Calendar { section: String },
    /// Free-form status text.
    Label(String),
    Unparseable,
}

/// Sections of an IPO calendar, in the order they are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarSection {
    Upcoming,
    Priced,
    Filed,
}

impl CalendarSection {
    pub const SEARCH_ORDER: [Self; 3] = [Self::Upcoming, Self::Priced, Self::Filed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Priced => "priced",
            Self::Filed => "filed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::SEARCH_ORDER
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Filed deals are announced but not yet open; the upcoming section lists
    /// deals taking orders this week; priced deals have closed their book.
    pub const fn status(self) -> IpoStatus {
        match self {
            Self::Upcoming => IpoStatus::SubscriptionOpen,
            Self::Priced => IpoStatus::SubscriptionClosed,
            Self::Filed => IpoStatus::Upcoming,
        }
    }
}
