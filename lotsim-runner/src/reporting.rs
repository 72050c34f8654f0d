//! Written artifacts: the text report and the equity CSV.
//!
//! The text report reserves a blank region at the top of the file before
//! anything else is written. The blotter streams in below it, and the
//! summary — only known after the full replay — is seeked back into the
//! reserved region, so the most useful numbers sit on the first lines
//! without rewriting the whole file.

use anyhow::{bail, Context, Result};
use lotsim_core::domain::{Execution, Side};
use lotsim_core::ledger::LedgerError;
use lotsim_core::report::{EquitySample, Report};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

/// Space reserved at the top of the report file for the summary.
const RESERVED_HEADER: usize = 4096;

/// Everything the text report needs beyond the statistics themselves.
pub struct ReportContext<'a> {
    pub strategy_name: &'a str,
    pub strategy_description: &'a str,
    pub report: &'a Report,
    pub executions: &'a [Execution],
    pub aborted: Option<&'a LedgerError>,
}

/// Write the full text report: reserved region, blotter, then the summary
/// into the reserved region.
pub fn write_report(path: &Path, ctx: &ReportContext<'_>) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;

    // blank padding first; the summary region is filled in last
    file.write_all(&vec![b' '; RESERVED_HEADER])?;
    writeln!(file)?;

    writeln!(file, "{:=^80}", " Blotter ")?;
    for execution in ctx.executions {
        write_blotter_entry(&mut file, execution)?;
    }
    if let Some(err) = ctx.aborted {
        writeln!(file, "{}", "- - ".repeat(20))?;
        writeln!(file, "[Abort] {err}")?;
        writeln!(file, "Statistics below cover the transactions executed before the abort.")?;
    }

    let summary = render_summary(ctx);
    if summary.len() > RESERVED_HEADER {
        bail!(
            "report summary ({} bytes) exceeds the reserved region ({RESERVED_HEADER} bytes)",
            summary.len()
        );
    }
    file.seek(SeekFrom::Start(0))?;
    file.write_all(summary.as_bytes())?;
    Ok(())
}

fn write_blotter_entry(file: &mut File, execution: &Execution) -> Result<()> {
    writeln!(file, "{}", "- - ".repeat(20))?;
    writeln!(
        file,
        "[{}] {} {} board lot(s) of {} at price {:.2} (per share)",
        execution.ts,
        execution.side.as_str(),
        execution.lots,
        execution.code,
        execution.price
    )?;
    match execution.side {
        Side::Buy => writeln!(file, "Commission charge: {:.2}", execution.commission)?,
        Side::Sell => writeln!(
            file,
            "Commission charge: {:.2},    Stamp tax: {:.2}",
            execution.commission, execution.stamp_tax
        )?,
    }
    writeln!(file, "Account cash: {:.2}", execution.cash_after)?;
    Ok(())
}

/// Render the summary sections. Two-decimal formatting happens here and
/// nowhere earlier.
fn render_summary(ctx: &ReportContext<'_>) -> String {
    let stats = &ctx.report.stats;
    let mut out = String::new();

    // writing to a String cannot fail; the unwraps below are formatting only
    let _ = writeln!(out, "{:=^80}", " Back Test Report ");
    let _ = writeln!(out, "Strategy: '{}'", ctx.strategy_name);
    if !ctx.strategy_description.is_empty() {
        let _ = writeln!(out, "{}", ctx.strategy_description);
    }
    if let Some((start, end)) = stats.timescope {
        let _ = writeln!(out, "Time scope: from {start} to {end}");
    }

    let traded: Vec<&str> = {
        let mut codes: Vec<&str> = ctx.executions.iter().map(|e| e.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    };
    if traded.is_empty() {
        let _ = writeln!(out, "Traded instruments: none");
    } else {
        let _ = writeln!(out, "Traded instruments: {}", traded.join(", "));
    }

    let _ = writeln!(out, "Initial capital: {:.2}", stats.capital);
    let holdings: Vec<String> = stats
        .final_holdings
        .iter()
        .filter(|(_, &lots)| lots > 0)
        .map(|(code, lots)| format!("{code}[{lots} board lot(s)]"))
        .collect();
    if holdings.is_empty() {
        let _ = writeln!(out, "Final holdings: none, cash[{:.2}]", stats.final_cash);
    } else {
        let _ = writeln!(
            out,
            "Final holdings: {}, cash[{:.2}]",
            holdings.join(", "),
            stats.final_cash
        );
    }

    match &stats.performance {
        Some(perf) => {
            let _ = writeln!(out, "Final equity: {:.2}", perf.final_equity);
            let _ = writeln!(out, "Profit: {:.2}", perf.profit);
            let _ = writeln!(out, "Rate of return: {:.2}%", perf.simple_return * 100.0);
            let _ = writeln!(
                out,
                "Annualized return: {:.2}%",
                perf.annualized_return * 100.0
            );
            match &perf.drawdown {
                Some(dd) => {
                    let _ = writeln!(
                        out,
                        "Maximum drawdown: {:.2}% ({:.2} from {} to {})",
                        dd.ratio * 100.0,
                        dd.depth,
                        dd.peak_ts,
                        dd.trough_ts
                    );
                }
                None => {
                    let _ = writeln!(out, "Maximum drawdown: none");
                }
            }
        }
        None => {
            let _ = writeln!(out, "No transactions were made in this run.");
        }
    }

    if ctx.aborted.is_some() {
        let _ = writeln!(out, "Note: the run aborted early; see the blotter for the cause.");
    }

    let _ = writeln!(out, "Commission charge: {:.2}", stats.total_commission);
    let _ = writeln!(out, "Stamp tax: {:.2}", stats.total_stamp_tax);
    out
}

/// Equity curve artifact: one `date,equity` row per reference timestamp.
pub fn write_equity_csv(path: &Path, curve: &[EquitySample]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create equity CSV {}", path.display()))?;
    writer.write_record(["date", "equity"])?;
    for sample in curve {
        writer.write_record([sample.ts.to_string(), format!("{:.4}", sample.equity)])?;
    }
    writer.flush()?;
    Ok(())
}
