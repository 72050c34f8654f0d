//! LotSim CLI — run board-lot backtests from a TOML settings file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lotsim_runner::{run_backtest, RunSummary, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lotsim", about = "LotSim — board-lot backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest described by a TOML settings file.
    Run {
        /// Path to the settings file.
        #[arg(long)]
        settings: PathBuf,

        /// Directory holding `<code>.<name>-<period>.csv` series files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory for the report and artifacts.
        #[arg(long, default_value = "report")]
        report_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            settings,
            data_dir,
            report_dir,
        } => {
            let settings = Settings::from_file(&settings)?;
            let summary = run_backtest(settings, &data_dir, &report_dir)?;
            print_summary(&summary);
            Ok(())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:        {}", summary.strategy);
    println!("Run id:          {}", &summary.run_id[..12]);
    if let Some((start, end)) = summary.stats.timescope {
        println!("Time scope:      {start} to {end}");
    }
    println!("Initial capital: {:.2}", summary.stats.capital);
    println!("Final cash:      {:.2}", summary.stats.final_cash);

    match &summary.stats.performance {
        Some(perf) => {
            println!();
            println!("--- Performance ---");
            println!("Final equity:    {:.2}", perf.final_equity);
            println!("Profit:          {:.2}", perf.profit);
            println!("Return:          {:.2}%", perf.simple_return * 100.0);
            println!("Annualized:      {:.2}%", perf.annualized_return * 100.0);
            match &perf.drawdown {
                Some(dd) => println!(
                    "Max drawdown:    {:.2}% ({} to {})",
                    dd.ratio * 100.0,
                    dd.peak_ts,
                    dd.trough_ts
                ),
                None => println!("Max drawdown:    none"),
            }
        }
        None => {
            println!();
            println!("No transactions were made in this run.");
        }
    }

    println!();
    println!("Commission:      {:.2}", summary.stats.total_commission);
    println!("Stamp tax:       {:.2}", summary.stats.total_stamp_tax);
    if let Some(aborted) = &summary.aborted {
        println!();
        println!("WARNING: run aborted early: {aborted}");
    }
    println!();
    println!("Report: {}", summary.report_path.display());
    if let Some(csv) = &summary.equity_csv_path {
        println!("Equity CSV: {}", csv.display());
    }
}
