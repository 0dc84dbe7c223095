pub mod nasdaq;
pub mod yahoo;

pub use nasdaq::NasdaqCalendarAdapter;
pub use yahoo::YahooAdapter;
