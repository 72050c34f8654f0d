//! Equity-curve reconstruction and drawdown tracking.

use crate::domain::TransactionRecord;
use crate::engine::Market;
use crate::ledger::SHARES_PER_LOT;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One floating-equity sample on the reference axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySample {
    pub ts: NaiveDateTime,
    pub equity: f64,
}

/// The worst peak-to-trough window observed on a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownWindow {
    /// `(peak - trough) / peak`.
    pub ratio: f64,
    /// `peak - trough`, in currency.
    pub depth: f64,
    pub peak_ts: NaiveDateTime,
    pub trough_ts: NaiveDateTime,
}

/// Replay the transaction records against daily closes on the reference
/// axis.
///
/// Each sample combines the latest record at or before the axis timestamp
/// with that day's close prices; a held instrument without a real bar that
/// day is valued at its synthesized close.
pub fn equity_curve(records: &[TransactionRecord], market: &Market) -> Vec<EquitySample> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut samples = Vec::with_capacity(market.axis().len());
    let mut cursor = 0;
    for &ts in market.axis() {
        while cursor + 1 < records.len() && records[cursor + 1].ts <= ts {
            cursor += 1;
        }
        let record = &records[cursor];

        let mut equity = record.cash_after;
        for (code, &lots) in &record.holdings_after {
            if lots == 0 {
                continue;
            }
            if let Some(close) = market.close_of(code, ts) {
                equity += lots as f64 * SHARES_PER_LOT * close;
            }
        }
        samples.push(EquitySample { ts, equity });
    }
    samples
}

/// Maximum drawdown across the whole curve.
///
/// The running peak is tracked sample by sample; for every trough the
/// optimal peak is the running maximum before it, so this finds the
/// numerically largest ratio over all peak/trough pairs. Ties are broken by
/// first occurrence (strict comparison). Returns `None` for curves that
/// never decline.
pub fn max_drawdown(curve: &[EquitySample]) -> Option<DrawdownWindow> {
    let first = curve.first()?;
    let mut peak = first.equity;
    let mut peak_ts = first.ts;
    let mut worst: Option<DrawdownWindow> = None;

    for sample in curve {
        if sample.equity > peak {
            peak = sample.equity;
            peak_ts = sample.ts;
            continue;
        }
        if peak <= 0.0 {
            continue;
        }
        let ratio = (peak - sample.equity) / peak;
        if ratio > worst.as_ref().map_or(0.0, |w| w.ratio) {
            worst = Some(DrawdownWindow {
                ratio,
                depth: peak - sample.equity,
                peak_ts,
                trough_ts: sample.ts,
            });
        }
    }
    worst
}
