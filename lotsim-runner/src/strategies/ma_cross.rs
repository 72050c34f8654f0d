//! Moving-average crossover demo strategy.

use lotsim_core::engine::{Market, Strategy};
use lotsim_core::ledger::{Account, LedgerError};

/// Buys the configured instrument when the short moving average sits above
/// the long one and liquidates when it falls back below — the classic
/// hold-flag loop over daily closes.
///
/// Single-instrument: only the first stock in the market is traded.
pub struct MaCross {
    short: usize,
    long: usize,
}

impl MaCross {
    pub fn new(short: usize, long: usize) -> Self {
        Self { short, long }
    }

    /// Simple moving average; the first `window - 1` slots are NaN.
    fn sma(values: &[f64], window: usize) -> Vec<f64> {
        let mut out = vec![f64::NAN; values.len()];
        if window == 0 || values.len() < window {
            return out;
        }
        let mut sum: f64 = values[..window].iter().sum();
        out[window - 1] = sum / window as f64;
        for i in window..values.len() {
            sum += values[i] - values[i - window];
            out[i] = sum / window as f64;
        }
        out
    }
}

impl Strategy for MaCross {
    fn name(&self) -> &str {
        "ma_cross"
    }

    fn description(&self) -> &str {
        "Buy when the short moving average rises above the long one; sell the position when it falls below."
    }

    fn compute_trading_points(
        &self,
        market: &Market,
        account: &mut Account,
        _lookback: usize,
    ) -> Result<(), LedgerError> {
        let Some((code, stock)) = market.stocks().iter().next() else {
            return Ok(());
        };
        let Some(series) = stock.daily() else {
            return Ok(());
        };

        let closes: Vec<f64> = series.bars.iter().map(|b| b.close).collect();
        let short_ma = Self::sma(&closes, self.short);
        let long_ma = Self::sma(&closes, self.long);

        // the warm-up portion exists only to feed the averages; trading
        // starts at the series' own actual lookback, not the requested one
        let mut held: u32 = 0;
        for (i, bar) in series.bars.iter().enumerate().skip(series.actual_lookback) {
            let (s, l) = (short_ma[i], long_ma[i]);
            if s.is_nan() || l.is_nan() {
                continue;
            }
            if held == 0 && s > l {
                let receipt = account.buy_by_ratio(code, bar.close, bar.ts, 1.0)?;
                held = receipt.lots;
            } else if held > 0 && s < l {
                account.sell(code, bar.close, bar.ts, held)?;
                held = 0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotsim_core::data::fill_missing;
    use lotsim_core::domain::{Bar, Series, SeriesId};
    use lotsim_core::engine::StockData;
    use lotsim_core::ledger::CostModel;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::collections::BTreeMap;

    fn day(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(i as i64)
    }

    fn market_from_closes(closes: &[f64]) -> Market {
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                ts: day(i),
                open: c,
                close: c,
                high: c,
                low: c,
                volume: 1_000.0,
                turnover: None,
            })
            .collect();
        let series = Series {
            id: "600000.pfyh-1Day".parse::<SeriesId>().unwrap(),
            bars,
            actual_lookback: 0,
        };
        let axis: Vec<_> = series.bars.iter().map(|b| b.ts).collect();
        let missing = fill_missing(&series, &axis);
        let mut stock = StockData::default();
        stock.insert(series, missing);
        let mut stocks = BTreeMap::new();
        stocks.insert("600000".to_string(), stock);
        Market::new(stocks, axis)
    }

    #[test]
    fn sma_warms_up_with_nan() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let ma = MaCross::sma(&values, 3);
        assert!(ma[0].is_nan());
        assert!(ma[1].is_nan());
        assert!((ma[2] - 2.0).abs() < 1e-12);
        assert!((ma[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn crossover_buys_the_rally_and_sells_the_fade() {
        // flat, then a rally that lifts the short average over the long,
        // then a slump that drops it back below
        let mut closes = vec![10.0; 10];
        closes.extend((1..=6).map(|i| 10.0 + i as f64 * 0.5)); // rally to 13.0
        closes.extend((1..=8).map(|i| 13.0 - i as f64 * 0.7)); // slump to 7.4

        let m = market_from_closes(&closes);
        let mut account = Account::new(100_000.0, CostModel::free());
        account.open(day(0));

        MaCross::new(2, 5)
            .compute_trading_points(&m, &mut account, 0)
            .unwrap();

        // one buy during the rally, one liquidating sell during the slump
        assert_eq!(account.executions().len(), 2);
        assert_eq!(account.lots_of("600000"), 0);
        let sides: Vec<_> = account.executions().iter().map(|e| e.side).collect();
        use lotsim_core::domain::Side;
        assert_eq!(sides, vec![Side::Buy, Side::Sell]);
    }

    #[test]
    fn flat_prices_never_trade() {
        let m = market_from_closes(&[10.0; 30]);
        let mut account = Account::new(100_000.0, CostModel::free());
        account.open(day(0));

        MaCross::new(5, 10)
            .compute_trading_points(&m, &mut account, 0)
            .unwrap();
        assert!(!account.has_traded());
    }
}
