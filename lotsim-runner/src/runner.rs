//! Backtest orchestration: load everything eagerly, replay once, write
//! artifacts.

use crate::config::Settings;
use crate::reporting::{write_equity_csv, write_report, ReportContext};
use crate::strategies;
use anyhow::{Context, Result};
use lotsim_core::data::{fill_missing, CsvStore};
use lotsim_core::engine::{Backtest, Market, StockData};
use lotsim_core::ledger::Account;
use lotsim_core::report::{self, ReportStats};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Machine-readable outcome of one backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub strategy: String,
    /// Ledger error that aborted the run, if any.
    pub aborted: Option<String>,
    pub stats: ReportStats,
    /// Present when `return_equity` is set.
    pub equity: Option<Vec<lotsim_core::report::EquitySample>>,
    pub report_path: PathBuf,
    pub equity_csv_path: Option<PathBuf>,
}

/// Run one backtest end to end.
///
/// All data loading happens before the strategy is invoked; the replay
/// itself performs no I/O. Artifacts land in `report_dir`.
pub fn run_backtest(settings: Settings, data_dir: &Path, report_dir: &Path) -> Result<RunSummary> {
    let run_id = settings.run_id();
    let settings = settings.resolve()?;
    let store = CsvStore::new(data_dir);

    // reference calendar first: every other series aligns to it
    let reference = store.load(
        &settings.reference,
        settings.dt_start,
        settings.dt_end,
        settings.n_ahead,
    )?;
    let axis: Vec<_> = reference.reported().iter().map(|b| b.ts).collect();

    let mut stocks: BTreeMap<String, StockData> = BTreeMap::new();
    for spec in &settings.pstocks {
        let series = store.load(spec, settings.dt_start, settings.dt_end, settings.n_ahead)?;
        let code = series.id.instrument.code.clone();
        let missing = if series.id.period.is_daily() {
            fill_missing(&series, &axis)
        } else {
            Default::default()
        };
        stocks.entry(code).or_default().insert(series, missing);
    }
    for (code, stock) in &stocks {
        if stock.daily().is_none() {
            warn!(code = code.as_str(), "no daily series; equity replay cannot value this instrument");
        }
    }

    let market = Market::new(stocks, axis);
    let account = Account::new(settings.capital, settings.costs);
    let mut backtest = Backtest::new(market, account, settings.n_ahead);

    let strategy = strategies::build(&settings.strategy);
    let outcome = backtest.run(strategy.as_ref());

    let (market, account) = backtest.into_parts();
    let report = report::generate(&account, &market);

    std::fs::create_dir_all(report_dir)
        .with_context(|| format!("failed to create report dir {}", report_dir.display()))?;

    let stem = format!("{}.{}", strategy.name(), &run_id[..12]);
    let report_path = report_dir.join(format!("{stem}.report.txt"));
    write_report(
        &report_path,
        &ReportContext {
            strategy_name: strategy.name(),
            strategy_description: strategy.description(),
            report: &report,
            executions: account.executions(),
            aborted: outcome.aborted(),
        },
    )?;

    let equity_csv_path = if settings.plot_equity || settings.plot_net_value {
        let path = report_dir.join(format!("{stem}.equity.csv"));
        write_equity_csv(&path, &report.curve)?;
        Some(path)
    } else {
        None
    };

    let summary = RunSummary {
        run_id,
        strategy: strategy.name().to_string(),
        aborted: outcome.aborted().map(|e| e.to_string()),
        stats: report.stats.clone(),
        equity: settings.return_equity.then(|| report.curve.clone()),
        report_path: report_path.clone(),
        equity_csv_path,
    };

    let summary_path = report_dir.join(format!("{stem}.summary.json"));
    let json = serde_json::to_string_pretty(&summary).context("failed to serialize run summary")?;
    std::fs::write(&summary_path, json)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    info!(
        strategy = summary.strategy.as_str(),
        report = %report_path.display(),
        "backtest finished"
    );
    Ok(summary)
}
