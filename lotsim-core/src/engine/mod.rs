//! Execution host: the market handed to strategies and the backtest driver.

mod host;
mod market;

pub use host::{Backtest, BarStepStrategy, BarStepped, RunOutcome, Strategy};
pub use market::{Market, StockData};
