//! Missing-bar synthesis against a reference trading calendar.
//!
//! A stock absent on a reference trading day (suspension, late listing) gets
//! a synthetic bar so equity replay always finds a close price. Synthesis
//! carries the last real bar forward; axis days before the first real bar
//! get all-zero bars. The result is a side table — the authoritative series
//! is never patched.

use crate::domain::{Bar, MissingBars, Series};
use chrono::NaiveDateTime;

/// Synthesize bars for every reference-axis timestamp absent from `series`.
pub fn fill_missing(series: &Series, reference_axis: &[NaiveDateTime]) -> MissingBars {
    let mut missing = MissingBars::default();
    let bars = &series.bars;
    let mut last_real: Option<&Bar> = None;
    let mut idx = 0;

    for &ts in reference_axis {
        while idx < bars.len() && bars[idx].ts < ts {
            last_real = Some(&bars[idx]);
            idx += 1;
        }
        if idx < bars.len() && bars[idx].ts == ts {
            last_real = Some(&bars[idx]);
            idx += 1;
            continue;
        }
        match last_real {
            Some(bar) => missing.push(bar.carry_forward(ts)),
            None => missing.push(Bar::zeroed(ts)),
        }
    }

    missing
}
