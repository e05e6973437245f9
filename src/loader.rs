//! File inputs of the command-line harness: CSV price histories and JSON fundamentals.

use anyhow::{Context, bail};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use core_types::{Fundamentals, PricePoint, PriceSeries};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const DATE_COLUMNS: [&str; 4] = ["date", "datetime", "timestamp", "time"];
const CLOSE_COLUMNS: [&str; 4] = ["close", "adj close", "adj_close", "price"];

/// Loads a closing-price series from a CSV file with a header row.
///
/// The date column may be a plain `YYYY-MM-DD` date (read as midnight UTC), an
/// RFC 3339 timestamp with offset, or `YYYY-MM-DD HH:MM:SS` (read as UTC). Rows whose
/// close is empty or not numeric (e.g. `null` for a holiday) are skipped.
pub fn load_prices(path: &Path) -> anyhow::Result<PriceSeries> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .with_context(|| format!("{} has no header row", path.display()))?
        .clone();
    let find = |candidates: &[&str]| {
        headers
            .iter()
            .position(|h| candidates.contains(&h.to_lowercase().as_str()))
    };
    let Some(date_idx) = find(&DATE_COLUMNS) else {
        bail!("{}: no date column (expected one of {DATE_COLUMNS:?})", path.display());
    };
    let Some(close_idx) = find(&CLOSE_COLUMNS) else {
        bail!("{}: no close column (expected one of {CLOSE_COLUMNS:?})", path.display());
    };

    let mut points = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{}: malformed row {}", path.display(), line + 2))?;
        let Some(close) = record.get(close_idx).and_then(|c| c.parse::<f64>().ok()) else {
            continue;
        };
        let raw = record.get(date_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw)
            .with_context(|| format!("{}: unreadable date '{raw}' on row {}", path.display(), line + 2))?;
        points.push(PricePoint::new(timestamp, close));
    }

    tracing::debug!(path = %path.display(), points = points.len(), "Price file loaded");
    PriceSeries::new(points).with_context(|| format!("{} is not a valid price series", path.display()))
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(ts);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc().fixed_offset());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
}

/// Loads fundamentals from a flat JSON object.
///
/// Keys may be snake_case field names or the data vendor's camelCase names; non-numeric
/// values are ignored.
pub fn load_fundamentals(path: &Path) -> anyhow::Result<Fundamentals> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let json: serde_json::Map<String, serde_json::Value> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a JSON object", path.display()))?;

    let fundamentals =
        Fundamentals::from_pairs(json.iter().filter_map(|(k, v)| v.as_f64().map(|v| (k.as_str(), v))));
    tracing::debug!(
        path = %path.display(),
        available = fundamentals.available(),
        "Fundamentals loaded"
    );
    Ok(fundamentals)
}

/// Splits a `NAME=path` argument; a bare path is named after its file stem.
pub fn named_path(arg: &str) -> (String, &Path) {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() => (name.to_string(), Path::new(path)),
        _ => {
            let path = Path::new(arg);
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| arg.to_string());
            (name, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("equilens-{}-{name}", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_supported_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-03-01").unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(
            parse_timestamp("2024-03-01T09:15:00+05:30").unwrap().to_rfc3339(),
            "2024-03-01T09:15:00+05:30"
        );
        assert_eq!(
            parse_timestamp("2024-03-01 15:30:00").unwrap().to_rfc3339(),
            "2024-03-01T15:30:00+00:00"
        );
        assert!(parse_timestamp("01/03/2024").is_err());
    }

    #[test]
    fn loads_yahoo_style_csv_and_skips_null_rows() {
        let path = temp_file(
            "prices.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-01,1,1,1,100.0,10\n\
             2024-01-02,1,1,1,null,0\n\
             2024-01-03,1,1,1,102.5,12\n",
        );
        let series = load_prices(&path).unwrap();
        assert_eq!(series.closes(), vec![100.0, 102.5]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_out_of_order_rows() {
        let path = temp_file("unordered.csv", "date,close\n2024-01-02,10\n2024-01-01,11\n");
        assert!(load_prices(&path).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn loads_vendor_keyed_fundamentals() {
        let path = temp_file(
            "fundamentals.json",
            r#"{"trailingPE": 22.4, "returnOnEquity": 0.19, "sector": "IT", "debt_to_equity": 0.3}"#,
        );
        let fundamentals = load_fundamentals(&path).unwrap();
        assert_eq!(fundamentals.trailing_pe, Some(22.4));
        assert_eq!(fundamentals.return_on_equity, Some(0.19));
        assert_eq!(fundamentals.debt_to_equity, Some(0.3));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn splits_named_paths() {
        let (name, path) = named_path("INFY=data/infy.csv");
        assert_eq!(name, "INFY");
        assert_eq!(path, Path::new("data/infy.csv"));

        let (name, _) = named_path("data/tcs.csv");
        assert_eq!(name, "tcs");
    }
}
