//! Instrument identity parsed from dataset identifiers.
//!
//! A dataset identifier has the form `<code>.<name>-<period>`, e.g.
//! `510300.300etf-1Day`; one backing file exists per identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Candlestick period encoded in a dataset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Minute60,
    Day1,
    Week1,
    Month1,
}

impl Period {
    /// The daily period anchors missing-bar synthesis and the equity replay.
    pub fn is_daily(&self) -> bool {
        matches!(self, Period::Day1)
    }

    /// Identifier suffix as it appears in dataset filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Minute1 => "1Minute",
            Period::Minute5 => "5Minute",
            Period::Minute15 => "15Minute",
            Period::Minute30 => "30Minute",
            Period::Minute60 => "60Minute",
            Period::Day1 => "1Day",
            Period::Week1 => "1Week",
            Period::Month1 => "1Month",
        }
    }
}

impl FromStr for Period {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1Minute" => Ok(Period::Minute1),
            "5Minute" => Ok(Period::Minute5),
            "15Minute" => Ok(Period::Minute15),
            "30Minute" => Ok(Period::Minute30),
            "60Minute" => Ok(Period::Minute60),
            "1Day" => Ok(Period::Day1),
            "1Week" => Ok(Period::Week1),
            "1Month" => Ok(Period::Month1),
            other => Err(InstrumentError::UnknownPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instrument identity: exchange code plus symbolic name.
///
/// Immutable once parsed from a dataset identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub code: String,
    pub name: String,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.code, self.name)
    }
}

/// Parsed dataset identifier: one (instrument, period) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId {
    pub instrument: Instrument,
    pub period: Period,
}

impl FromStr for SeriesId {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // the name part may itself contain '-', so split the period off the end
        let (stock, period) = s
            .rsplit_once('-')
            .ok_or_else(|| InstrumentError::Malformed(s.to_string()))?;
        let (code, name) = stock
            .split_once('.')
            .ok_or_else(|| InstrumentError::Malformed(s.to_string()))?;
        if code.is_empty() || name.is_empty() {
            return Err(InstrumentError::Malformed(s.to_string()));
        }
        Ok(SeriesId {
            instrument: Instrument {
                code: code.to_string(),
                name: name.to_string(),
            },
            period: period.parse()?,
        })
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.instrument, self.period)
    }
}

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("dataset identifier '{0}' is not in the form <code>.<name>-<period>")]
    Malformed(String),

    #[error("unknown candlestick period '{0}'")]
    UnknownPeriod(String),
}
