//! Example strategies — clients of the engine, selected by settings.
//!
//! The engine itself ships no trading logic; these exist so the CLI and the
//! integration tests have something to drive it with. Real strategies live
//! outside this workspace and implement [`Strategy`] the same way.

mod ma_cross;

pub use ma_cross::MaCross;

use crate::config::StrategySpec;
use lotsim_core::engine::{Market, Strategy};
use lotsim_core::ledger::{Account, LedgerError};

/// Instantiate the strategy named by the settings.
pub fn build(spec: &StrategySpec) -> Box<dyn Strategy> {
    match spec {
        StrategySpec::MaCross { short, long } => Box::new(MaCross::new(*short, *long)),
        StrategySpec::BuyAndHold => Box::new(BuyAndHold),
    }
}

/// Buys with the full capital on the first tradable reference bar and holds
/// to the end.
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn description(&self) -> &str {
        "Buy with the full capital on the first tradable bar and hold to the end."
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
        // first reference bar on which the instrument actually traded
        for &ts in market.axis() {
            if let Some(bar) = series.bar_at(ts) {
                if bar.close > 0.0 {
                    account.buy_by_position(code, bar.close, ts, 1.0)?;
                    break;
                }
            }
        }
        Ok(())
    }
}
