//! Export analysis results.
//!
//! - aligned rows as CSV, easy to consume in spreadsheets
//! - the full analysis (rows, correlations, summary) as JSON

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{AlignedRecord, CorrelationOutcome};
use crate::error::AppError;
use crate::report::Summary;

/// JSON document written by `write_report_json`.
#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a> {
    pub tool: &'static str,
    pub market_label: &'a str,
    pub records: &'a [AlignedRecord],
    pub correlation: &'a CorrelationOutcome,
    pub summary: Option<&'a Summary>,
}

/// Write aligned rows; a missing change is an empty cell.
pub fn write_aligned_csv(path: &Path, records: &[AlignedRecord]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,faith_score,market_value,market_value_pct_change")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{}",
            r.date,
            r.faith_score,
            r.market_value,
            r.market_value_pct_change.map(|v| v.to_string()).unwrap_or_default(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the analysis JSON. Undefined statistics serialize as `null`.
pub fn write_report_json(path: &Path, export: &AnalysisExport<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, export)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}
