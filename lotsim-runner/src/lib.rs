//! LotSim Runner — backtest orchestration around the core engine.
//!
//! Wires the pieces together: settings from a TOML file, eager data
//! loading, the strategy registry, the replay itself, and the written
//! artifacts (text report with a reserved summary region, equity CSV,
//! JSON run summary).

pub mod config;
pub mod reporting;
pub mod runner;
pub mod strategies;

pub use config::{ResolvedSettings, Settings, SettingsError, StrategySpec};
pub use runner::{run_backtest, RunSummary};
