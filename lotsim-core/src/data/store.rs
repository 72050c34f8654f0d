//! CSV-backed series loading with window selection and lookback clamping.

use super::DataError;
use crate::domain::{Bar, Series, SeriesId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Store reading one delimited file per `(instrument, period)` pair.
///
/// Files are named `<code>.<name>-<period>.csv` under the store root. The
/// first column is the timestamp; the remaining columns are located by
/// header name (`open`, `close`, `high`, `low`, `volume`, and optionally
/// `turnover`).
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
    delimiter: u8,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: b',',
        }
    }

    /// Some datasets are space-delimited; the column contract is unchanged.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load the series named by `spec` over `[start, end]` (inclusive),
    /// with up to `lookback` extra bars before the window for indicator
    /// warm-up.
    ///
    /// If fewer than `lookback` bars precede the window the load still
    /// succeeds and the returned [`Series::actual_lookback`] carries the
    /// smaller value — unless no bars precede the window at all, which is
    /// [`DataError::InsufficientHistory`].
    pub fn load(
        &self,
        spec: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        lookback: usize,
    ) -> Result<Series, DataError> {
        let id: SeriesId = spec.parse()?;
        let path = self.root.join(format!("{spec}.csv"));
        if !path.is_file() {
            return Err(DataError::DataNotFound {
                spec: spec.to_string(),
                path,
            });
        }

        let bars = read_bars(&path, spec, self.delimiter)?;

        let first = bars.partition_point(|b| b.ts < start);
        let last = bars.partition_point(|b| b.ts <= end);
        if first == last {
            return Err(DataError::EmptyWindow {
                spec: spec.to_string(),
                start,
                end,
            });
        }

        let begin = first.saturating_sub(lookback);
        let actual_lookback = first - begin;
        if lookback > 0 && actual_lookback == 0 {
            return Err(DataError::InsufficientHistory {
                spec: spec.to_string(),
                start,
            });
        }
        if actual_lookback < lookback {
            warn!(
                series = spec,
                requested = lookback,
                actual = actual_lookback,
                "lookback truncated by available history"
            );
        }

        Ok(Series {
            id,
            bars: bars[begin..last].to_vec(),
            actual_lookback,
        })
    }
}

fn read_bars(path: &Path, spec: &str, delimiter: u8) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let malformed = |row: usize, reason: String| DataError::Malformed {
        spec: spec.to_string(),
        row,
        reason,
    };

    let open_col = col("open").ok_or_else(|| malformed(0, "missing 'open' column".into()))?;
    let close_col = col("close").ok_or_else(|| malformed(0, "missing 'close' column".into()))?;
    let high_col = col("high").ok_or_else(|| malformed(0, "missing 'high' column".into()))?;
    let low_col = col("low").ok_or_else(|| malformed(0, "missing 'low' column".into()))?;
    let volume_col = col("volume").ok_or_else(|| malformed(0, "missing 'volume' column".into()))?;
    let turnover_col = col("turnover");

    let mut bars: Vec<Bar> = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = row_idx + 2; // header is row 1
        let field = |i: usize| -> Result<f64, DataError> {
            let raw = record
                .get(i)
                .ok_or_else(|| malformed(row, format!("missing column {i}")))?;
            raw.parse::<f64>()
                .map_err(|e| malformed(row, format!("'{raw}': {e}")))
        };

        let raw_ts = record
            .get(0)
            .ok_or_else(|| malformed(row, "missing timestamp".into()))?;
        let ts = parse_timestamp(raw_ts)
            .ok_or_else(|| malformed(row, format!("unparseable timestamp '{raw_ts}'")))?;

        if let Some(prev) = bars.last() {
            if ts == prev.ts {
                return Err(DataError::DuplicateTimestamp {
                    spec: spec.to_string(),
                    ts,
                });
            }
            if ts < prev.ts {
                return Err(DataError::OutOfOrder {
                    spec: spec.to_string(),
                    ts,
                });
            }
        }

        bars.push(Bar {
            ts,
            open: field(open_col)?,
            close: field(close_col)?,
            high: field(high_col)?,
            low: field(low_col)?,
            volume: field(volume_col)?,
            turnover: turnover_col.map(field).transpose()?,
        });
    }

    Ok(bars)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 6, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn write_series(dir: &TempDir, spec: &str, rows: &[&str]) {
        let path = dir.path().join(format!("{spec}.csv"));
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "datetime,open,close,high,low,volume").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
    }

    fn standard_fixture(dir: &TempDir) {
        write_series(
            dir,
            "600000.pfyh-1Day",
            &[
                "2015-06-01,10.0,10.1,10.2,9.9,1000",
                "2015-06-02,10.1,10.3,10.4,10.0,1100",
                "2015-06-03,10.3,10.2,10.5,10.1,900",
                "2015-06-04,10.2,10.6,10.7,10.2,1200",
                "2015-06-05,10.6,10.4,10.8,10.3,800",
            ],
        );
    }

    #[test]
    fn load_selects_inclusive_window() {
        let dir = TempDir::new().unwrap();
        standard_fixture(&dir);
        let store = CsvStore::new(dir.path());

        let series = store
            .load("600000.pfyh-1Day", ts(2), ts(4), 0)
            .unwrap();
        assert_eq!(series.actual_lookback, 0);
        assert_eq!(series.bars.len(), 3);
        assert_eq!(series.bars[0].ts, ts(2));
        assert_eq!(series.bars[2].ts, ts(4));
    }

    #[test]
    fn load_supplies_requested_lookback() {
        let dir = TempDir::new().unwrap();
        standard_fixture(&dir);
        let store = CsvStore::new(dir.path());

        let series = store
            .load("600000.pfyh-1Day", ts(3), ts(5), 2)
            .unwrap();
        assert_eq!(series.actual_lookback, 2);
        assert_eq!(series.bars[0].ts, ts(1));
        assert_eq!(series.reported()[0].ts, ts(3));
    }

    #[test]
    fn load_clamps_lookback_to_available_history() {
        let dir = TempDir::new().unwrap();
        standard_fixture(&dir);
        let store = CsvStore::new(dir.path());

        let series = store
            .load("600000.pfyh-1Day", ts(2), ts(5), 10)
            .unwrap();
        assert_eq!(series.actual_lookback, 1);
        assert_eq!(series.bars[0].ts, ts(1));
    }

    #[test]
    fn load_rejects_zero_available_lookback() {
        let dir = TempDir::new().unwrap();
        standard_fixture(&dir);
        let store = CsvStore::new(dir.path());

        let err = store
            .load("600000.pfyh-1Day", ts(1), ts(5), 10)
            .unwrap_err();
        assert!(matches!(err, DataError::InsufficientHistory { .. }));
    }

    #[test]
    fn load_zero_lookback_at_history_start_is_fine() {
        let dir = TempDir::new().unwrap();
        standard_fixture(&dir);
        let store = CsvStore::new(dir.path());

        let series = store
            .load("600000.pfyh-1Day", ts(1), ts(5), 0)
            .unwrap();
        assert_eq!(series.actual_lookback, 0);
        assert_eq!(series.bars.len(), 5);
    }

    #[test]
    fn load_missing_file_is_data_not_found() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path());
        let err = store
            .load("999999.ghost-1Day", ts(1), ts(5), 0)
            .unwrap_err();
        assert!(matches!(err, DataError::DataNotFound { .. }));
    }

    #[test]
    fn load_empty_window_is_an_error() {
        let dir = TempDir::new().unwrap();
        standard_fixture(&dir);
        let store = CsvStore::new(dir.path());
        let err = store
            .load("600000.pfyh-1Day", ts(20), ts(25), 0)
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyWindow { .. }));
    }

    #[test]
    fn load_detects_duplicate_timestamp() {
        let dir = TempDir::new().unwrap();
        write_series(
            &dir,
            "600000.pfyh-1Day",
            &[
                "2015-06-01,10.0,10.1,10.2,9.9,1000",
                "2015-06-01,10.1,10.3,10.4,10.0,1100",
            ],
        );
        let store = CsvStore::new(dir.path());
        let err = store
            .load("600000.pfyh-1Day", ts(1), ts(5), 0)
            .unwrap_err();
        assert!(matches!(err, DataError::DuplicateTimestamp { .. }));
    }

    #[test]
    fn load_detects_unsorted_rows() {
        let dir = TempDir::new().unwrap();
        write_series(
            &dir,
            "600000.pfyh-1Day",
            &[
                "2015-06-02,10.0,10.1,10.2,9.9,1000",
                "2015-06-01,10.1,10.3,10.4,10.0,1100",
            ],
        );
        let store = CsvStore::new(dir.path());
        let err = store
            .load("600000.pfyh-1Day", ts(1), ts(5), 0)
            .unwrap_err();
        assert!(matches!(err, DataError::OutOfOrder { .. }));
    }

    #[test]
    fn load_parses_datetime_stamps_and_turnover() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("510300.300etf-5Minute.csv");
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "datetime,open,close,high,low,volume,turnover").unwrap();
        writeln!(file, "2015-06-01 09:35:00,3.0,3.1,3.2,2.9,500,1550.0").unwrap();
        writeln!(file, "2015-06-01 09:40:00,3.1,3.0,3.1,3.0,400,1210.0").unwrap();

        let store = CsvStore::new(dir.path());
        let start = ts(1);
        let end = NaiveDate::from_ymd_opt(2015, 6, 1)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let series = store.load("510300.300etf-5Minute", start, end, 0).unwrap();
        assert_eq!(series.bars.len(), 2);
        assert_eq!(series.bars[0].turnover, Some(1550.0));
    }

    #[test]
    fn load_rejects_malformed_price() {
        let dir = TempDir::new().unwrap();
        write_series(&dir, "600000.pfyh-1Day", &["2015-06-01,abc,10.1,10.2,9.9,1000"]);
        let store = CsvStore::new(dir.path());
        let err = store
            .load("600000.pfyh-1Day", ts(1), ts(5), 0)
            .unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
    }
}
