//! CSV price-series loading.
//!
//! Expects a header row with `time,open,high,low,close,volume`. The time
//! column accepts unix seconds, `YYYY-MM-DD`, or RFC 3339. Only structural
//! problems are reported here; series-level validation (monotonic time,
//! finite fields) is the engine's job.

use std::path::Path;

use anyhow::{bail, Context, Result};
use backlab_core::Candle;
use chrono::{DateTime, NaiveDate, Utc};

pub fn load_candles(path: &Path) -> Result<Vec<Candle>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("missing column '{name}' in {}", path.display()))
    };
    let time_col = col("time")?;
    let open_col = col("open")?;
    let high_col = col("high")?;
    let low_col = col("low")?;
    let close_col = col("close")?;
    let volume_col = col("volume")?;

    let mut candles = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("row {}", row + 1))?;
        let field = |idx: usize| -> Result<f64> {
            record
                .get(idx)
                .with_context(|| format!("row {}: short record", row + 1))?
                .trim()
                .parse::<f64>()
                .with_context(|| format!("row {}: not a number", row + 1))
        };
        candles.push(Candle {
            time: parse_time(record.get(time_col).unwrap_or_default())
                .with_context(|| format!("row {}: bad timestamp", row + 1))?,
            open: field(open_col)?,
            high: field(high_col)?,
            low: field(low_col)?,
            close: field(close_col)?,
            volume: field(volume_col)?,
        });
    }
    Ok(candles)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp(secs, 0)
            .with_context(|| format!("unix timestamp out of range: {secs}"));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .context("invalid midnight timestamp")?;
        return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    bail!("unrecognized timestamp '{raw}' (expected unix seconds, YYYY-MM-DD, or RFC 3339)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_unix_second_timestamps() {
        let file = write_temp(
            "time,open,high,low,close,volume\n\
             1704067200,100,101,99,100.5,1000\n\
             1704153600,100.5,102,100,101.5,1100\n",
        );
        let candles = load_candles(file.path()).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 100.5);
        assert_eq!(
            candles[0].time,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn loads_date_only_timestamps() {
        let file = write_temp(
            "time,open,high,low,close,volume\n\
             2024-01-01,100,101,99,100.5,1000\n",
        );
        let candles = load_candles(file.path()).unwrap();
        assert_eq!(
            candles[0].time,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn reports_bad_timestamp_with_row() {
        let file = write_temp(
            "time,open,high,low,close,volume\n\
             yesterday,100,101,99,100.5,1000\n",
        );
        let err = load_candles(file.path()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let file = write_temp("time,open,close\n1704067200,100,100.5\n");
        let err = load_candles(file.path()).unwrap_err();
        assert!(err.to_string().contains("high"));
    }
}
