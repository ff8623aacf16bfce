/// Error types shared by the state layer and the app shell
///
/// None of these are fatal. Every variant is recovered by the caller and
/// degrades to a safe screen: an inline login message, a fallback to the
/// Locker, or a report sorted to the oldest end of the list.
use thiserror::Error;

use crate::state::data::ReportId;

#[derive(Debug, Error)]
pub enum Error {
    /// Login was attempted with an identifier that is empty after trimming
    #[error("please enter a valid patient ID")]
    EmptyInput,

    /// No report with this id exists in the report store
    #[error("report {0} not found")]
    NotFound(ReportId),

    /// A report carries a date that is not a calendar date
    #[error("unparseable report date {0:?}")]
    UnparseableDate(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The deferred report fetch failed; retried on request or on the next Locker visit
    #[error("could not load reports: {0}")]
    Fetch(String),

    #[error("report data is malformed: {0}")]
    Data(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
