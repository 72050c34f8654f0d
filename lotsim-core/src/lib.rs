//! LotSim Core — board-lot backtesting engine.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (bars, instruments, series, ledger records)
//! - Time-series store with lookback handling and missing-bar synthesis
//! - Account ledger with lot rounding, commission, and stamp tax
//! - Execution host driving a strategy over a reference time axis
//! - Report statistics (equity curve, drawdown, returns)
//!
//! Strategies themselves are clients of this crate: they receive the market
//! and the account and communicate trades solely through the ledger API.

pub mod data;
pub mod domain;
pub mod engine;
pub mod ledger;
pub mod report;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types that cross the host boundary are
    /// Send + Sync, so a caller may run backtests from worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Instrument>();
        require_sync::<domain::Instrument>();
        require_send::<domain::Series>();
        require_sync::<domain::Series>();
        require_send::<domain::TransactionRecord>();
        require_sync::<domain::TransactionRecord>();

        require_send::<ledger::Account>();
        require_sync::<ledger::Account>();
        require_send::<ledger::CostModel>();
        require_sync::<ledger::CostModel>();

        require_send::<engine::Market>();
        require_sync::<engine::Market>();
        require_send::<engine::Backtest>();
        require_sync::<engine::Backtest>();

        require_send::<report::Report>();
        require_sync::<report::Report>();
    }
}
