use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by window arithmetic and argument validation.
///
/// Transient layout problems (a host failing to honour a scroll request) are
/// not errors; the controller retries them on the next frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Moving `days` away from `date` leaves the representable calendar.
    #[error("shifting {date} by {days} days leaves the supported date range")]
    DateOutOfRange { date: NaiveDate, days: i64 },
    /// An index past the end of the materialized window was requested.
    #[error("index {index} is outside the window of {len} days")]
    IndexOutOfWindow { index: usize, len: usize },
    /// The selector was configured with values it cannot work with.
    #[error("invalid date selector arguments: {0}")]
    InvalidArgs(&'static str),
}
