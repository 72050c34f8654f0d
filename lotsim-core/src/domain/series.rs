//! Series — ordered bars for one (instrument, period) pair.

use super::bar::Bar;
use super::instrument::SeriesId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Ordered bar sequence covering `[start - actual_lookback bars, end]`.
///
/// The first `actual_lookback` bars exist only to warm up lag-based
/// indicators; the reported window starts after them. `actual_lookback` may
/// be smaller than the lookback the caller requested when history does not
/// extend far enough back — callers must use this value, not the requested
/// one, when slicing off the warm-up portion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub bars: Vec<Bar>,
    pub actual_lookback: usize,
}

impl Series {
    /// Bars of the reported window, warm-up portion skipped.
    pub fn reported(&self) -> &[Bar] {
        &self.bars[self.actual_lookback..]
    }

    /// First and last reported timestamps, if any bars are reported.
    pub fn timescope(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let reported = self.reported();
        Some((reported.first()?.ts, reported.last()?.ts))
    }

    /// The bar at exactly `ts`, if the instrument traded then.
    pub fn bar_at(&self, ts: NaiveDateTime) -> Option<&Bar> {
        self.bars
            .binary_search_by_key(&ts, |b| b.ts)
            .ok()
            .map(|i| &self.bars[i])
    }

    /// Close price at exactly `ts`.
    pub fn close_at(&self, ts: NaiveDateTime) -> Option<f64> {
        self.bar_at(ts).map(|b| b.close)
    }
}

/// Synthesized bars for reference-axis timestamps missing from a series.
///
/// A separate side table: the authoritative series is never patched. Bars
/// are kept sorted by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingBars {
    bars: Vec<Bar>,
}

impl MissingBars {
    pub(crate) fn push(&mut self, bar: Bar) {
        debug_assert!(self.bars.last().map_or(true, |b| b.ts < bar.ts));
        self.bars.push(bar);
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar_at(&self, ts: NaiveDateTime) -> Option<&Bar> {
        self.bars
            .binary_search_by_key(&ts, |b| b.ts)
            .ok()
            .map(|i| &self.bars[i])
    }

    pub fn close_at(&self, ts: NaiveDateTime) -> Option<f64> {
        self.bar_at(ts).map(|b| b.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::SeriesId;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 6, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            ts: ts(day),
            open: close - 0.1,
            close,
            high: close + 0.2,
            low: close - 0.3,
            volume: 1_000.0,
            turnover: None,
        }
    }

    fn series(lookback: usize) -> Series {
        Series {
            id: "600000.pfyh-1Day".parse::<SeriesId>().unwrap(),
            bars: vec![bar(1, 10.0), bar(2, 10.5), bar(3, 10.2), bar(4, 10.8)],
            actual_lookback: lookback,
        }
    }

    #[test]
    fn reported_skips_warmup() {
        let s = series(2);
        assert_eq!(s.reported().len(), 2);
        assert_eq!(s.reported()[0].ts, ts(3));
    }

    #[test]
    fn timescope_covers_reported_window() {
        let s = series(1);
        assert_eq!(s.timescope(), Some((ts(2), ts(4))));
    }

    #[test]
    fn close_lookup_by_timestamp() {
        let s = series(0);
        assert_eq!(s.close_at(ts(2)), Some(10.5));
        assert_eq!(s.close_at(ts(9)), None);
    }

    #[test]
    fn missing_bars_lookup() {
        let mut missing = MissingBars::default();
        missing.push(bar(2, 10.0).carry_forward(ts(5)));
        assert_eq!(missing.len(), 1);
        assert_eq!(missing.close_at(ts(5)), Some(10.0));
        assert_eq!(missing.close_at(ts(2)), None);
    }
}
