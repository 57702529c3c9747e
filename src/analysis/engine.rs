//! Correlation engine and correlation classification.
//!
//! Two analyses run over the aligned records:
//!
//! - value level: faith score vs market value, all rows
//! - change level: faith score vs market percent change, rows that have a change
//!   (every row but the first in a gap-free series)
//!
//! Fewer than `MIN_ALIGNED_RECORDS` rows yields `CorrelationOutcome::Insufficient`.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{AlignedRecord, AnalysisKind, AnalysisResult, CorrelationOutcome, CorrelationReport, CorrelationResult};
use crate::math::{pearson_test, spearman_test};

pub const MIN_ALIGNED_RECORDS: usize = 3;
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Run both analyses, or report that there is not enough data.
pub fn correlate(records: &[AlignedRecord]) -> CorrelationOutcome {
    if records.len() < MIN_ALIGNED_RECORDS {
        warn!(
            available = records.len(),
            required = MIN_ALIGNED_RECORDS,
            "not enough aligned records for correlation"
        );
        return CorrelationOutcome::Insufficient {
            available: records.len(),
            required: MIN_ALIGNED_RECORDS,
        };
    }

    let faith: Vec<f64> = records.iter().map(|r| r.faith_score).collect();
    let values: Vec<f64> = records.iter().map(|r| r.market_value).collect();
    let value_level = analyze(AnalysisKind::ValueLevel, &faith, &values);

    let (faith_c, changes): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter_map(|r| r.market_value_pct_change.map(|c| (r.faith_score, c)))
        .unzip();
    let change_level = analyze(AnalysisKind::ChangeLevel, &faith_c, &changes);

    info!(
        n = value_level.n,
        pearson = value_level.pearson.coefficient,
        p = value_level.pearson.p_value,
        change_pearson = change_level.pearson.coefficient,
        "correlation computed"
    );

    CorrelationOutcome::Computed(CorrelationReport {
        value_level,
        change_level,
    })
}

fn analyze(kind: AnalysisKind, faith: &[f64], market: &[f64]) -> AnalysisResult {
    AnalysisResult {
        kind,
        n: faith.len(),
        pearson: pearson_test(faith, market),
        spearman: spearman_test(faith, market),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

impl Strength {
    pub fn from_coefficient(r: f64) -> Self {
        let r = r.abs();
        if r > 0.5 {
            Strength::Strong
        } else if r > 0.3 {
            Strength::Moderate
        } else if r > 0.1 {
            Strength::Weak
        } else {
            Strength::VeryWeak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
            Strength::VeryWeak => "very weak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn from_coefficient(r: f64) -> Self {
        if r > 0.0 { Direction::Positive } else { Direction::Negative }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Positive => "positive",
            Direction::Negative => "negative",
        }
    }
}

/// Strength, direction and significance of one (Pearson) result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub strength: Strength,
    pub direction: Direction,
    pub significant: bool,
}

impl Classification {
    /// Undefined coefficients classify as very weak, negative, not significant.
    pub fn of(result: &CorrelationResult) -> Self {
        Self {
            strength: Strength::from_coefficient(result.coefficient),
            direction: Direction::from_coefficient(result.coefficient),
            significant: result.p_value < SIGNIFICANCE_LEVEL,
        }
    }
}
