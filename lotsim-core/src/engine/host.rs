//! Backtest host: drives one strategy over one market and owns the account.
//!
//! There is no ambient simulator: the market and the account are passed to
//! the strategy explicitly, so several backtests can run in one process
//! without sharing state.

use super::market::Market;
use crate::ledger::{Account, LedgerError};
use chrono::NaiveDateTime;
use tracing::{error, info};

/// Strategy contract — the single-shot shape.
///
/// The callback receives the whole market once and iterates internally;
/// trades happen solely through the [`Account`] API. A returned
/// [`LedgerError`] aborts the run. Ordinary early termination (a
/// trade-count cap, nothing left to do) is expressed by returning `Ok(())`,
/// never by an error.
pub trait Strategy {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// `lookback` is the lookback the caller *requested*; each series
    /// carries the possibly smaller lookback it actually received.
    fn compute_trading_points(
        &self,
        market: &Market,
        account: &mut Account,
        lookback: usize,
    ) -> Result<(), LedgerError>;
}

/// Legacy per-bar shape: a narrower hook invoked once per reference bar.
pub trait BarStepStrategy {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn on_bar(
        &self,
        ts: NaiveDateTime,
        market: &Market,
        account: &mut Account,
    ) -> Result<(), LedgerError>;
}

/// Adapter that replays the reference axis through a [`BarStepStrategy`].
pub struct BarStepped<S>(pub S);

impl<S: BarStepStrategy> Strategy for BarStepped<S> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn compute_trading_points(
        &self,
        market: &Market,
        account: &mut Account,
        _lookback: usize,
    ) -> Result<(), LedgerError> {
        for &ts in market.axis() {
            self.0.on_bar(ts, market, account)?;
        }
        Ok(())
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Completed,
    /// The strategy hit a ledger error. Transactions up to that point are
    /// kept and reported; the run is not retried or resumed.
    Aborted(LedgerError),
}

impl RunOutcome {
    pub fn aborted(&self) -> Option<&LedgerError> {
        match self {
            RunOutcome::Completed => None,
            RunOutcome::Aborted(err) => Some(err),
        }
    }
}

/// Single-strategy backtest over one market.
#[derive(Debug)]
pub struct Backtest {
    market: Market,
    account: Account,
    lookback: usize,
}

impl Backtest {
    /// Attach an account to a market. The initial ledger snapshot is
    /// stamped with the first axis timestamp.
    pub fn new(market: Market, mut account: Account, lookback: usize) -> Self {
        if let Some(&ts) = market.axis().first() {
            account.open(ts);
        }
        Self {
            market,
            account,
            lookback,
        }
    }

    /// Run the strategy to completion or to its first ledger error.
    pub fn run(&mut self, strategy: &dyn Strategy) -> RunOutcome {
        info!(strategy = strategy.name(), "running backtest");
        match strategy.compute_trading_points(&self.market, &mut self.account, self.lookback) {
            Ok(()) => RunOutcome::Completed,
            Err(err) => {
                error!(%err, "strategy aborted by ledger error; reporting the partial run");
                RunOutcome::Aborted(err)
            }
        }
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn into_parts(self) -> (Market, Account) {
        (self.market, self.account)
    }
}
