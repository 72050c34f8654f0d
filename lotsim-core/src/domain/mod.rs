//! Domain types: bars, instruments, series, ledger records.

pub mod bar;
pub mod instrument;
pub mod record;
pub mod series;

pub use bar::Bar;
pub use instrument::{Instrument, InstrumentError, Period, SeriesId};
pub use record::{Execution, Holdings, Side, TransactionRecord};
pub use series::{MissingBars, Series};
