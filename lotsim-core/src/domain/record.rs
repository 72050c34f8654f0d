//! Ledger records: the audit trail and the human-readable execution log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lots held per instrument code.
pub type Holdings = BTreeMap<String, u32>;

/// Audit-trail entry appended after every transaction.
///
/// The first record is written when the ledger opens, carrying the initial
/// capital and empty holdings. Records are never removed, and their
/// timestamps are non-decreasing — the report generator replays the list in
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub ts: NaiveDateTime,
    pub cash_after: f64,
    pub holdings_after: Holdings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

/// Blotter entry for one executed order.
///
/// Richer than the audit record: the report's blotter section is rendered
/// from these, while equity replay uses only [`TransactionRecord`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub ts: NaiveDateTime,
    pub side: Side,
    pub code: String,
    pub price: f64,
    pub lots: u32,
    pub commission: f64,
    pub stamp_tax: f64,
    pub cash_after: f64,
}
