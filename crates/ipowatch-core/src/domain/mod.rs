//! # Domain Models
//!
//! Canonical types shared by sources, the state store and the notifier.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`IpoStatus`] | Closed set of IPO lifecycle stages |
//! | [`StatusSignal`] | Raw upstream evidence fed to [`IpoStatus::classify`] |
//! | [`CalendarSection`] | IPO calendar sections and their stage |
//! | [`IpoInfo`] | Snapshot produced by one check |
//! | [`Symbol`] | Validated ticker |
//! | [`UtcDateTime`] | UTC timestamp |

mod info;
mod status;
mod symbol;
mod timestamp;

pub use info::IpoInfo;
pub use status::{CalendarSection, IpoStatus, StatusSignal};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
