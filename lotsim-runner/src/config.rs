//! Backtest settings loaded from a TOML file.
//!
//! Optional keys fall back to documented defaults with a logged warning;
//! out-of-range values are fatal at startup, before any data is touched.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lotsim_core::domain::{InstrumentError, SeriesId};
use lotsim_core::ledger::CostModel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Deterministic identifier for a settings file's content.
pub type RunId = String;

/// Raw settings as they appear in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Series identifiers to load, `<code>.<name>-<period>` each.
    pub pstocks: Vec<String>,

    /// Series whose trading calendar becomes the reference time axis.
    /// Defaults to the first daily entry of `pstocks`.
    pub reference: Option<String>,

    /// Strategy selection (tagged by `type`).
    pub strategy: StrategySpec,

    /// Start date, `YYYY-MM-DD`, inclusive.
    pub dt_start: String,

    /// End date, `YYYY-MM-DD`, inclusive.
    pub dt_end: String,

    /// Extra bars before `dt_start` for indicator warm-up.
    pub n_ahead: Option<usize>,

    pub capital: Option<f64>,
    pub stamp_tax_rate: Option<f64>,
    pub commission_rate: Option<f64>,
    pub min_commission: Option<f64>,

    /// Write the equity curve CSV artifact.
    #[serde(default)]
    pub plot_equity: bool,

    /// Write the equity curve CSV artifact (net-value post-processing reads
    /// the same file).
    #[serde(default)]
    pub plot_net_value: bool,

    /// Embed the equity curve in the JSON run summary.
    #[serde(default)]
    pub return_equity: bool,
}

/// Strategy selection, dispatched by the registry in
/// [`crate::strategies::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategySpec {
    /// Moving-average crossover on daily closes.
    MaCross { short: usize, long: usize },

    /// Buy with the full capital on the first tradable bar and hold.
    BuyAndHold,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("pstocks must name at least one series")]
    NoSeries,

    #[error("invalid date '{raw}': expected YYYY-MM-DD")]
    BadDate { raw: String },

    #[error("dt_start {start} must precede dt_end {end}")]
    BadTimeScope { start: NaiveDate, end: NaiveDate },

    #[error("capital must be positive, got {0}")]
    BadCapital(f64),

    #[error("{name} must lie in [0, 1), got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("min_commission must be non-negative, got {0}")]
    BadMinCommission(f64),

    #[error("reference series '{0}' is not listed in pstocks")]
    UnknownReference(String),

    #[error("reference series '{0}' must be a daily series")]
    NonDailyReference(String),

    #[error("no daily series in pstocks to anchor the reference axis")]
    NoDailySeries,

    #[error(transparent)]
    Id(#[from] InstrumentError),
}

/// Settings after validation, with every default applied.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub pstocks: Vec<String>,
    pub reference: String,
    pub strategy: StrategySpec,
    pub dt_start: NaiveDateTime,
    pub dt_end: NaiveDateTime,
    pub n_ahead: usize,
    pub capital: f64,
    pub costs: CostModel,
    pub plot_equity: bool,
    pub plot_net_value: bool,
    pub return_equity: bool,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(raw)?)
    }

    /// Content-addressed run id: identical settings produce identical ids.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("settings serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Validate and apply defaults. Missing optional keys warn and fall
    /// back; invalid values fail before any simulation starts.
    pub fn resolve(self) -> Result<ResolvedSettings, SettingsError> {
        if self.pstocks.is_empty() {
            return Err(SettingsError::NoSeries);
        }
        // every identifier must parse before data loading begins
        let ids: Vec<SeriesId> = self
            .pstocks
            .iter()
            .map(|s| s.parse::<SeriesId>())
            .collect::<Result<_, _>>()?;

        let start = parse_date(&self.dt_start)?;
        let end = parse_date(&self.dt_end)?;
        if start >= end {
            return Err(SettingsError::BadTimeScope { start, end });
        }

        let capital = match self.capital {
            Some(c) if c > 0.0 => c,
            Some(c) => return Err(SettingsError::BadCapital(c)),
            None => {
                warn!("capital not set; defaulting to 10000");
                10_000.0
            }
        };

        let stamp_tax_rate = resolve_rate(
            "stamp_tax_rate",
            self.stamp_tax_rate,
            CostModel::DEFAULT_STAMP_TAX_RATE,
        )?;
        let commission_rate = resolve_rate(
            "commission_rate",
            self.commission_rate,
            CostModel::DEFAULT_COMMISSION_RATE,
        )?;
        let min_commission = match self.min_commission {
            Some(m) if m >= 0.0 => m,
            Some(m) => return Err(SettingsError::BadMinCommission(m)),
            None => CostModel::DEFAULT_MIN_COMMISSION,
        };

        let n_ahead = self.n_ahead.unwrap_or_else(|| {
            warn!("n_ahead not set; defaulting to 0 (no indicator warm-up)");
            0
        });

        let reference = match self.reference {
            Some(reference) => {
                let id: SeriesId = reference.parse()?;
                if !id.period.is_daily() {
                    return Err(SettingsError::NonDailyReference(reference));
                }
                if !self.pstocks.contains(&reference) {
                    return Err(SettingsError::UnknownReference(reference));
                }
                reference
            }
            None => {
                let daily = ids
                    .iter()
                    .position(|id| id.period.is_daily())
                    .ok_or(SettingsError::NoDailySeries)?;
                let reference = self.pstocks[daily].clone();
                warn!(%reference, "reference not set; using the first daily series");
                reference
            }
        };

        Ok(ResolvedSettings {
            pstocks: self.pstocks,
            reference,
            strategy: self.strategy,
            dt_start: start.and_time(NaiveTime::MIN),
            dt_end: end_of_day(end),
            n_ahead,
            capital,
            costs: CostModel {
                commission_rate,
                min_commission,
                stamp_tax_rate,
            },
            plot_equity: self.plot_equity,
            plot_net_value: self.plot_net_value,
            return_equity: self.return_equity,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, SettingsError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| SettingsError::BadDate {
        raw: raw.to_string(),
    })
}

fn resolve_rate(
    name: &'static str,
    value: Option<f64>,
    default: f64,
) -> Result<f64, SettingsError> {
    match value {
        Some(v) if (0.0..1.0).contains(&v) => Ok(v),
        Some(v) => Err(SettingsError::RateOutOfRange { name, value: v }),
        None => {
            warn!(default, "{name} not set; using the default");
            Ok(default)
        }
    }
}

/// Inclusive end bound: the last second of the end date, so intraday bars
/// on that date are selected too.
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("valid literal time"))
}
