//! Market — everything a strategy may read.

use crate::domain::{Instrument, MissingBars, Period, Series};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Per-instrument data: authoritative series per period plus the
/// synthesized daily bars for reference days the instrument skipped.
#[derive(Debug, Clone, Default)]
pub struct StockData {
    series: BTreeMap<Period, Series>,
    missing: MissingBars,
}

impl StockData {
    /// Insert a loaded series; daily series also receive the missing-bar
    /// side table computed against the reference axis.
    pub fn insert(&mut self, series: Series, missing: MissingBars) {
        if series.id.period.is_daily() {
            self.missing = missing;
        }
        self.series.insert(series.id.period, series);
    }

    pub fn instrument(&self) -> Option<&Instrument> {
        self.series.values().next().map(|s| &s.id.instrument)
    }

    pub fn series(&self, period: Period) -> Option<&Series> {
        self.series.get(&period)
    }

    /// The daily series, which anchors equity replay.
    pub fn daily(&self) -> Option<&Series> {
        self.series.get(&Period::Day1)
    }

    pub fn missing(&self) -> &MissingBars {
        &self.missing
    }

    /// Daily close on a reference timestamp: the real bar when the
    /// instrument traded, otherwise the synthesized one.
    pub fn close_at(&self, ts: NaiveDateTime) -> Option<f64> {
        self.daily()
            .and_then(|s| s.close_at(ts))
            .or_else(|| self.missing.close_at(ts))
    }
}

/// Market data bundle: per-code stock data and the reference time axis the
/// backtest replays over. Strategies receive this read-only.
#[derive(Debug, Clone)]
pub struct Market {
    stocks: BTreeMap<String, StockData>,
    axis: Vec<NaiveDateTime>,
}

impl Market {
    pub fn new(stocks: BTreeMap<String, StockData>, axis: Vec<NaiveDateTime>) -> Self {
        Self { stocks, axis }
    }

    pub fn stocks(&self) -> &BTreeMap<String, StockData> {
        &self.stocks
    }

    pub fn stock(&self, code: &str) -> Option<&StockData> {
        self.stocks.get(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.stocks.keys().map(String::as_str)
    }

    /// The reference trading calendar (ascending, from the benchmark
    /// series' reported window).
    pub fn axis(&self) -> &[NaiveDateTime] {
        &self.axis
    }

    /// First and last axis timestamps.
    pub fn timescope(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((*self.axis.first()?, *self.axis.last()?))
    }

    /// Daily close for a code on a reference timestamp.
    pub fn close_of(&self, code: &str, ts: NaiveDateTime) -> Option<f64> {
        self.stocks.get(code).and_then(|s| s.close_at(ts))
    }
}
