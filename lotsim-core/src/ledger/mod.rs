//! Account ledger — the execution/accounting state machine.
//!
//! All order handling happens here: board-lot rounding, commission with a
//! minimum charge, sell-side stamp tax, and the append-only transaction
//! record that the report generator later replays. Every operation is
//! atomic: it either fully succeeds or fails without touching state.

mod cost;

pub use cost::CostModel;

use crate::domain::{Execution, Holdings, Side, TransactionRecord};
use chrono::NaiveDateTime;
use thiserror::Error;

/// One board lot is 100 shares; all quantities are whole lots.
pub const SHARES_PER_LOT: f64 = 100.0;

/// Errors raised during order execution. All of them abort the current run
/// at the host boundary; none of them leave partial state behind.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The bid cannot cover a single board lot.
    #[error("bid {bid:.2} is below the value of one board lot ({lot_value:.2})")]
    BidTooLow { bid: f64, lot_value: f64 },

    #[error("one board lot needs {needed:.2} but only {cash:.2} cash is available")]
    InsufficientFunds { needed: f64, cash: f64 },

    /// A ratio sell that cannot produce a whole lot.
    #[error("cannot split a holding of {held} lot(s) by ratio {ratio}")]
    CanNotSplitShare { held: u32, ratio: f64 },

    #[error("cannot sell {requested} lot(s) of {code}: {held} held")]
    SellError {
        code: String,
        held: u32,
        requested: u32,
    },

    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Receipt for an executed buy.
#[derive(Debug, Clone)]
pub struct BuyReceipt {
    /// Lots actually bought after rounding the bid down.
    pub lots: u32,
    /// Snapshot of all holdings after the order.
    pub holdings: Holdings,
    /// Cash after notional and commission.
    pub cash: f64,
}

/// Receipt for an executed sell.
#[derive(Debug, Clone)]
pub struct SellReceipt {
    pub holdings: Holdings,
    pub cash: f64,
}

/// Cash-and-shares account with an append-only transaction ledger.
///
/// Money is plain `f64` and is never rounded mid-computation; formatting to
/// two decimals happens at report time only. Lot quantities are integers —
/// partial lots are never modeled.
#[derive(Debug, Clone)]
pub struct Account {
    capital: f64,
    cash: f64,
    holdings: Holdings,
    costs: CostModel,
    total_commission: f64,
    total_stamp_tax: f64,
    records: Vec<TransactionRecord>,
    executions: Vec<Execution>,
}

impl Account {
    pub fn new(capital: f64, costs: CostModel) -> Self {
        Self {
            capital,
            cash: capital,
            holdings: Holdings::new(),
            costs,
            total_commission: 0.0,
            total_stamp_tax: 0.0,
            records: Vec::new(),
            executions: Vec::new(),
        }
    }

    /// Write the initial snapshot record. Called once when the backtest
    /// attaches the account to a time axis; later calls are no-ops.
    pub fn open(&mut self, ts: NaiveDateTime) {
        if self.records.is_empty() {
            self.records.push(TransactionRecord {
                ts,
                cash_after: self.cash,
                holdings_after: self.holdings.clone(),
            });
        }
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    /// Lots currently held for a code; zero when the code was never traded.
    pub fn lots_of(&self, code: &str) -> u32 {
        self.holdings.get(code).copied().unwrap_or(0)
    }

    pub fn total_commission(&self) -> f64 {
        self.total_commission
    }

    pub fn total_stamp_tax(&self) -> f64 {
        self.total_stamp_tax
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn executions(&self) -> &[Execution] {
        &self.executions
    }

    /// True once any order has executed beyond the initial snapshot.
    pub fn has_traded(&self) -> bool {
        !self.executions.is_empty()
    }

    /// Buy with a fraction of the *current cash* — reinvests profits.
    pub fn buy_by_ratio(
        &mut self,
        code: &str,
        price: f64,
        ts: NaiveDateTime,
        ratio: f64,
    ) -> LedgerResult<BuyReceipt> {
        check_fraction("ratio", ratio)?;
        check_price(price)?;
        self.buy_with_bid(code, price, ts, self.cash * ratio)
    }

    /// Buy with a fraction of the *initial capital* — ignores profits.
    pub fn buy_by_position(
        &mut self,
        code: &str,
        price: f64,
        ts: NaiveDateTime,
        position: f64,
    ) -> LedgerResult<BuyReceipt> {
        check_fraction("position", position)?;
        check_price(price)?;
        self.buy_with_bid(code, price, ts, self.capital * position)
    }

    /// Buy with a literal cash amount.
    pub fn buy_by_cash(
        &mut self,
        code: &str,
        price: f64,
        ts: NaiveDateTime,
        cash_amount: f64,
    ) -> LedgerResult<BuyReceipt> {
        if cash_amount <= 0.0 {
            return Err(LedgerError::InvalidOrder {
                reason: format!("cash amount must be positive, got {cash_amount}"),
            });
        }
        check_price(price)?;
        self.buy_with_bid(code, price, ts, cash_amount)
    }

    fn buy_with_bid(
        &mut self,
        code: &str,
        price: f64,
        ts: NaiveDateTime,
        bid: f64,
    ) -> LedgerResult<BuyReceipt> {
        let lot_value = SHARES_PER_LOT * price;
        if bid < lot_value {
            return Err(LedgerError::BidTooLow { bid, lot_value });
        }
        if self.cash < lot_value {
            return Err(LedgerError::InsufficientFunds {
                needed: lot_value,
                cash: self.cash,
            });
        }

        let mut lots = (bid / lot_value).floor() as u32;
        // the floored notional can still sit an epsilon above the available
        // cash when the bid was computed from it; step down until it fits
        while lots as f64 * lot_value > self.cash {
            lots -= 1;
        }
        let need_cash = lots as f64 * lot_value;

        self.cash -= need_cash;
        *self.holdings.entry(code.to_string()).or_insert(0) += lots;

        let commission = self.costs.commission_on(need_cash);
        self.cash -= commission;
        self.total_commission += commission;

        self.push_transaction(ts, Side::Buy, code, price, lots, commission, 0.0);
        Ok(BuyReceipt {
            lots,
            holdings: self.holdings.clone(),
            cash: self.cash,
        })
    }

    /// Sell a whole number of lots.
    pub fn sell(
        &mut self,
        code: &str,
        price: f64,
        ts: NaiveDateTime,
        lots: u32,
    ) -> LedgerResult<SellReceipt> {
        check_price(price)?;
        if lots == 0 {
            return Err(LedgerError::InvalidOrder {
                reason: "sell quantity must be at least one lot".to_string(),
            });
        }
        let held = match self.holdings.get(code) {
            Some(&held) => held,
            None => {
                return Err(LedgerError::SellError {
                    code: code.to_string(),
                    held: 0,
                    requested: lots,
                })
            }
        };
        if lots > held {
            return Err(LedgerError::SellError {
                code: code.to_string(),
                held,
                requested: lots,
            });
        }

        let income = lots as f64 * price * SHARES_PER_LOT;
        self.cash += income;
        if let Some(entry) = self.holdings.get_mut(code) {
            *entry -= lots;
        }

        let commission = self.costs.commission_on(income);
        let stamp_tax = self.costs.stamp_tax_on(income);
        self.cash -= commission + stamp_tax;
        self.total_commission += commission;
        self.total_stamp_tax += stamp_tax;

        self.push_transaction(ts, Side::Sell, code, price, lots, commission, stamp_tax);
        Ok(SellReceipt {
            holdings: self.holdings.clone(),
            cash: self.cash,
        })
    }

    /// Sell a fraction of the current holding, rounded down to whole lots.
    ///
    /// Fails with [`LedgerError::CanNotSplitShare`] when the fraction rounds
    /// to zero lots — notably a single held lot with any ratio below one.
    pub fn sell_by_ratio(
        &mut self,
        code: &str,
        price: f64,
        ts: NaiveDateTime,
        ratio: f64,
    ) -> LedgerResult<SellReceipt> {
        check_fraction("ratio", ratio)?;
        check_price(price)?;
        let held = self.lots_of(code);
        if held == 0 {
            return Err(LedgerError::SellError {
                code: code.to_string(),
                held: 0,
                requested: 0,
            });
        }
        let lots = (held as f64 * ratio).floor() as u32;
        if lots == 0 {
            return Err(LedgerError::CanNotSplitShare { held, ratio });
        }
        self.sell(code, price, ts, lots)
    }

    fn push_transaction(
        &mut self,
        ts: NaiveDateTime,
        side: Side,
        code: &str,
        price: f64,
        lots: u32,
        commission: f64,
        stamp_tax: f64,
    ) {
        debug_assert!(self.records.last().map_or(true, |r| r.ts <= ts));
        self.records.push(TransactionRecord {
            ts,
            cash_after: self.cash,
            holdings_after: self.holdings.clone(),
        });
        self.executions.push(Execution {
            ts,
            side,
            code: code.to_string(),
            price,
            lots,
            commission,
            stamp_tax,
            cash_after: self.cash,
        });
    }
}

fn check_price(price: f64) -> LedgerResult<()> {
    if price > 0.0 && price.is_finite() {
        Ok(())
    } else {
        Err(LedgerError::InvalidOrder {
            reason: format!("price must be positive and finite, got {price}"),
        })
    }
}

fn check_fraction(name: &str, value: f64) -> LedgerResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidOrder {
            reason: format!("{name} must lie in (0, 1], got {value}"),
        })
    }
}
