//! Bar — one OHLCV record for a fixed time period.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Candlestick bar for a single instrument and period.
///
/// Field order follows the input tables: open, close, high, low, volume.
/// `turnover` is present in some datasets only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: NaiveDateTime,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub turnover: Option<f64>,
}

impl Bar {
    /// Basic OHLC sanity check: high/low bound open and close, prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }

    /// Synthetic bar carrying this bar's fields forward to a later timestamp.
    pub fn carry_forward(&self, ts: NaiveDateTime) -> Bar {
        Bar { ts, ..self.clone() }
    }

    /// All-zero placeholder for axis timestamps before any real bar exists.
    pub fn zeroed(ts: NaiveDateTime) -> Bar {
        Bar {
            ts,
            open: 0.0,
            close: 0.0,
            high: 0.0,
            low: 0.0,
            volume: 0.0,
            turnover: None,
        }
    }
}
