//! Time-series store: delimited candlestick tables plus missing-bar
//! synthesis against a reference trading calendar.

mod fill;
mod store;

pub use fill::fill_missing;
pub use store::CsvStore;

use crate::domain::InstrumentError;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the time-series store.
#[derive(Debug, Error)]
pub enum DataError {
    /// No backing file exists for the requested series. Fatal: nothing can
    /// be simulated without data.
    #[error("no data found for series '{spec}' at {path}")]
    DataNotFound { spec: String, path: PathBuf },

    /// Zero bars precede the requested window start while a lookback was
    /// requested. Partial lookback is tolerated; none at all is not.
    #[error("insufficient history for '{spec}': no bars precede {start}")]
    InsufficientHistory { spec: String, start: NaiveDateTime },

    #[error("series '{spec}' has no bars between {start} and {end}")]
    EmptyWindow {
        spec: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Duplicate timestamps are data corruption, not a recoverable gap.
    #[error("duplicate timestamp {ts} in series '{spec}'")]
    DuplicateTimestamp { spec: String, ts: NaiveDateTime },

    #[error("series '{spec}' is not sorted ascending at {ts}")]
    OutOfOrder { spec: String, ts: NaiveDateTime },

    #[error("malformed data in '{spec}' (row {row}): {reason}")]
    Malformed {
        spec: String,
        row: usize,
        reason: String,
    },

    #[error(transparent)]
    Id(#[from] InstrumentError),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
