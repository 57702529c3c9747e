//! Two-column date series tables (`Date,<value>`).
//!
//! The collector writes faith scores this way and the market command writes market
//! values; the analysis reads both back.
//!
//! Reading is lenient per row: a bad date or number is recorded as a `RowError` and
//! skipped, while a missing column is a hard error (exit code 2).

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{FaithScore, MarketDataPoint};
use crate::error::AppError;

pub const FAITH_SCORE_COLUMN: &str = "Faith Score";

/// A row-level error encountered while reading a series table.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed series table: rows sorted by date, first occurrence per date.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub value_column: String,
    pub rows: Vec<(NaiveDate, f64)>,
    pub row_errors: Vec<RowError>,
    pub duplicate_dates: usize,
}

impl SeriesTable {
    pub fn faith_scores(&self) -> Vec<FaithScore> {
        self.rows.iter().map(|&(date, score)| FaithScore { date, score }).collect()
    }

    pub fn market_points(&self) -> Vec<MarketDataPoint> {
        self.rows.iter().map(|&(date, value)| MarketDataPoint { date, value }).collect()
    }
}

/// Write `Date,<value_column>` rows sorted by date.
pub fn write_series_csv(path: &Path, value_column: &str, rows: &[(NaiveDate, f64)]) -> Result<(), AppError> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|r| r.0);

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    writer
        .write_record(["Date", value_column])
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;
    for (date, value) in &sorted {
        writer
            .write_record([date.to_string(), value.to_string()])
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = sorted.len(), column = value_column, "wrote series table");
    Ok(())
}

/// Read a `Date,<value>` table. The value column is the first non-date column.
pub fn read_series_csv(path: &Path) -> Result<SeriesTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let (date_idx, value_idx) = resolve_columns(&headers)
        .ok_or_else(|| AppError::new(2, format!("CSV '{}' needs a Date column and a value column", path.display())))?;
    let value_column = clean_header(&headers[value_idx]).to_string();

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut row_errors = Vec::new();
    let mut duplicate_dates = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // header is line 1
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        match parse_row(&record, date_idx, value_idx) {
            Ok((date, value)) => {
                if by_date.contains_key(&date) {
                    duplicate_dates += 1;
                } else {
                    by_date.insert(date, value);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(path = %path.display(), skipped = row_errors.len(), "skipped malformed rows");
    }

    Ok(SeriesTable {
        value_column,
        rows: by_date.into_iter().collect(),
        row_errors,
        duplicate_dates,
    })
}

fn resolve_columns(headers: &StringRecord) -> Option<(usize, usize)> {
    let date_idx = headers
        .iter()
        .position(|h| clean_header(h).eq_ignore_ascii_case("date"))?;
    let value_idx = (0..headers.len()).find(|&i| i != date_idx)?;
    Some((date_idx, value_idx))
}

fn clean_header(name: &str) -> &str {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}')
}

fn parse_row(record: &StringRecord, date_idx: usize, value_idx: usize) -> Result<(NaiveDate, f64), String> {
    let raw_date = record.get(date_idx).unwrap_or("");
    let raw_value = record.get(value_idx).unwrap_or("");
    // tolerate a time suffix, e.g. "2024-01-02 00:00:00"
    let date_part = raw_date.split([' ', 'T']).next().unwrap_or("");
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| format!("Invalid date '{raw_date}'"))?;
    let value: f64 = raw_value
        .parse()
        .map_err(|_| format!("Invalid value '{raw_value}' on {date}"))?;
    if !value.is_finite() {
        return Err(format!("Non-finite value on {date}"));
    }
    Ok((date, value))
}
