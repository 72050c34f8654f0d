//! Transaction-cost parameters.

use serde::{Deserialize, Serialize};

/// Commission and tax schedule applied by the ledger.
///
/// The minimum commission is a fixed currency floor charged on every order
/// whose proportional commission falls below it. A commission rate of
/// exactly zero disables the charge entirely, floor included; callers who
/// want a tiny rate without the floor configure `min_commission` instead of
/// relying on the rate's magnitude.
///
/// Stamp tax is charged on the sell side only; configure it to zero for
/// tax-exempt instruments such as ETFs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub commission_rate: f64,
    pub min_commission: f64,
    pub stamp_tax_rate: f64,
}

impl CostModel {
    pub const DEFAULT_COMMISSION_RATE: f64 = 2.5e-4;
    pub const DEFAULT_MIN_COMMISSION: f64 = 5.0;
    pub const DEFAULT_STAMP_TAX_RATE: f64 = 0.001;

    pub fn new(commission_rate: f64, stamp_tax_rate: f64) -> Self {
        Self {
            commission_rate,
            min_commission: Self::DEFAULT_MIN_COMMISSION,
            stamp_tax_rate,
        }
    }

    /// No commission, no tax. Keeps arithmetic exact in tests.
    pub fn free() -> Self {
        Self {
            commission_rate: 0.0,
            min_commission: 0.0,
            stamp_tax_rate: 0.0,
        }
    }

    pub(crate) fn commission_on(&self, notional: f64) -> f64 {
        if self.commission_rate == 0.0 {
            return 0.0;
        }
        (notional * self.commission_rate).max(self.min_commission)
    }

    pub(crate) fn stamp_tax_on(&self, income: f64) -> f64 {
        income * self.stamp_tax_rate
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            commission_rate: Self::DEFAULT_COMMISSION_RATE,
            min_commission: Self::DEFAULT_MIN_COMMISSION,
            stamp_tax_rate: Self::DEFAULT_STAMP_TAX_RATE,
        }
    }
}
