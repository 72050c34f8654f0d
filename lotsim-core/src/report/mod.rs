//! Report statistics assembled after a replay.
//!
//! Pure functions of the finished account and the market: generating a
//! report twice for the same run yields identical numbers.

mod equity;

pub use equity::{equity_curve, max_drawdown, DrawdownWindow, EquitySample};

use crate::engine::Market;
use crate::ledger::Account;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Performance section of a report. Absent when no transactions occurred
/// beyond the initial snapshot — there is nothing to divide in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub final_equity: f64,
    /// `equity_end - equity_start`.
    pub profit: f64,
    /// `profit / initial_capital`.
    pub simple_return: f64,
    /// Simple return compounded over the elapsed calendar span.
    pub annualized_return: f64,
    pub drawdown: Option<DrawdownWindow>,
}

/// Full statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub timescope: Option<(NaiveDateTime, NaiveDateTime)>,
    pub capital: f64,
    pub final_cash: f64,
    pub final_holdings: crate::domain::Holdings,
    pub total_commission: f64,
    pub total_stamp_tax: f64,
    pub performance: Option<Performance>,
}

/// Statistics plus the equity curve they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub stats: ReportStats,
    pub curve: Vec<EquitySample>,
}

/// Replay the finished account against the market and assemble the report.
pub fn generate(account: &Account, market: &Market) -> Report {
    let timescope = market.timescope();

    let (curve, performance) = if account.has_traded() {
        let curve = equity_curve(account.records(), market);
        let performance = performance_of(&curve, account.capital());
        (curve, performance)
    } else {
        (Vec::new(), None)
    };

    Report {
        stats: ReportStats {
            timescope,
            capital: account.capital(),
            final_cash: account.cash(),
            final_holdings: account.holdings().clone(),
            total_commission: account.total_commission(),
            total_stamp_tax: account.total_stamp_tax(),
            performance,
        },
        curve,
    }
}

fn performance_of(curve: &[EquitySample], capital: f64) -> Option<Performance> {
    let first = curve.first()?;
    let last = curve.last()?;

    let profit = last.equity - first.equity;
    let simple_return = if capital > 0.0 { profit / capital } else { 0.0 };

    let days = (last.ts - first.ts).num_days() as f64;
    let annualized_return = if days > 0.0 && 1.0 + simple_return > 0.0 {
        (1.0 + simple_return).powf(365.25 / days) - 1.0
    } else {
        0.0
    };

    Some(Performance {
        final_equity: last.equity,
        profit,
        simple_return,
        annualized_return,
        drawdown: max_drawdown(curve),
    })
}
