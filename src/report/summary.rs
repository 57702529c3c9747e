//! Narrative classification and faith cohorts derived from engine output.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::{Classification, Direction, Strength};
use crate::domain::{AlignedRecord, AnalysisKind, AnalysisResult, CorrelationOutcome};
use crate::math::{mean, sample_std};

/// Dataset overview of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub records: usize,
    pub mean_faith_score: f64,
    pub mean_market_value: f64,
}

/// Classified reading of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Narrative {
    pub kind: AnalysisKind,
    pub classification: Classification,
    /// R² as a percentage of faith score variance.
    pub explained_variance_pct: f64,
}

impl Narrative {
    pub fn of(result: &AnalysisResult) -> Self {
        Self {
            kind: result.kind,
            classification: Classification::of(&result.pearson),
            explained_variance_pct: result.r_squared() * 100.0,
        }
    }

    /// e.g. "Moderate positive correlation".
    pub fn headline(&self) -> String {
        let text = format!(
            "{} {} correlation",
            self.classification.strength.label(),
            self.classification.direction.label()
        );
        capitalize(&text)
    }
}

/// Days in one faith cohort and the mean of the market metric over them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cohort {
    pub days: usize,
    pub mean: f64,
}

/// High/low faith split of a set of rows.
///
/// High: faith ≥ mean + 1 stdev. Low: faith ≤ mean − 1 stdev. Empty cohorts are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CohortSplit {
    pub faith_mean: f64,
    pub faith_std: f64,
    pub high_threshold: f64,
    pub low_threshold: f64,
    pub high: Option<Cohort>,
    pub low: Option<Cohort>,
}

impl CohortSplit {
    /// Split `(faith, metric)` pairs; `None` below two rows.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Option<Self> {
        let faith: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let faith_mean = mean(&faith)?;
        let faith_std = sample_std(&faith)?;
        let high_threshold = faith_mean + faith_std;
        let low_threshold = faith_mean - faith_std;

        let cohort = |keep: &dyn Fn(f64) -> bool| -> Option<Cohort> {
            let metric: Vec<f64> = pairs.iter().filter(|p| keep(p.0)).map(|p| p.1).collect();
            mean(&metric).map(|m| Cohort {
                days: metric.len(),
                mean: m,
            })
        };

        Some(Self {
            faith_mean,
            faith_std,
            high_threshold,
            low_threshold,
            high: cohort(&|f: f64| f >= high_threshold),
            low: cohort(&|f: f64| f <= low_threshold),
        })
    }
}

/// Market value cohorts over all rows, market change cohorts over rows with a change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CohortReport {
    pub value: Option<CohortSplit>,
    pub change: Option<CohortSplit>,
}

impl CohortReport {
    pub fn from_records(records: &[AlignedRecord]) -> Self {
        let value_pairs: Vec<(f64, f64)> = records.iter().map(|r| (r.faith_score, r.market_value)).collect();
        let change_pairs: Vec<(f64, f64)> = records
            .iter()
            .filter_map(|r| r.market_value_pct_change.map(|c| (r.faith_score, c)))
            .collect();
        Self {
            value: CohortSplit::from_pairs(&value_pairs),
            change: CohortSplit::from_pairs(&change_pairs),
        }
    }
}

/// Everything the summary report prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub data: DataSummary,
    pub value_level: Narrative,
    pub change_level: Narrative,
    pub cohorts: CohortReport,
    pub assessment: Vec<String>,
    pub findings: Vec<String>,
    pub implications: Vec<String>,
}

/// Build the summary. `None` when the engine had too little data.
pub fn summarize(records: &[AlignedRecord], outcome: &CorrelationOutcome) -> Option<Summary> {
    let report = outcome.report()?;
    let data = data_summary(records)?;
    let value_level = Narrative::of(&report.value_level);
    let change_level = Narrative::of(&report.change_level);

    Some(Summary {
        data,
        value_level,
        change_level,
        cohorts: CohortReport::from_records(records),
        assessment: assessment(&value_level, &change_level),
        findings: findings(&report.value_level),
        implications: implications(&value_level),
    })
}

fn data_summary(records: &[AlignedRecord]) -> Option<DataSummary> {
    let first_date = records.iter().map(|r| r.date).min()?;
    let last_date = records.iter().map(|r| r.date).max()?;
    let faith: Vec<f64> = records.iter().map(|r| r.faith_score).collect();
    let values: Vec<f64> = records.iter().map(|r| r.market_value).collect();
    Some(DataSummary {
        first_date,
        last_date,
        records: records.len(),
        mean_faith_score: mean(&faith)?,
        mean_market_value: mean(&values)?,
    })
}

fn assessment(value_level: &Narrative, change_level: &Narrative) -> Vec<String> {
    let mut out = Vec::new();
    if value_level.classification.significant || change_level.classification.significant {
        out.push("Same-day market movements show a relationship with news sentiment".to_string());
        out.push(direction_sentence(value_level.classification.direction));
    } else {
        out.push("Same-day market movements do not show a significant relationship with news sentiment".to_string());
    }
    out
}

fn findings(value_level: &AnalysisResult) -> Vec<String> {
    let r = value_level.pearson.coefficient;
    let influence = match Strength::from_coefficient(r) {
        Strength::Strong | Strength::Moderate => "moderate",
        Strength::Weak => "weak",
        Strength::VeryWeak => "very weak",
    };
    let significance = if Classification::of(&value_level.pearson).significant {
        "Statistical significance: YES - results are reliable"
    } else {
        "Statistical significance: NO - results may be due to chance"
    };
    vec![
        format!("Same-day market value shows {influence} influence on news sentiment"),
        direction_sentence(Direction::from_coefficient(r)),
        significance.to_string(),
    ]
}

fn implications(value_level: &Narrative) -> Vec<String> {
    if value_level.classification.significant {
        vec![
            "Market movements influence news sentiment".to_string(),
            "News sentiment may be reactive rather than predictive".to_string(),
        ]
    } else {
        vec![
            "Market movements do not significantly influence news sentiment".to_string(),
            "News sentiment may be independent of recent market performance".to_string(),
        ]
    }
}

fn direction_sentence(direction: Direction) -> String {
    match direction {
        Direction::Positive => "Higher same-day market value correlates with higher faith scores".to_string(),
        Direction::Negative => "Higher same-day market value correlates with lower faith scores".to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    use crate::analysis::correlate;

    fn records(rows: &[(f64, f64)]) -> Vec<AlignedRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let faith: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| crate::domain::FaithScore {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                score: r.0,
            })
            .collect();
        let market: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| crate::domain::MarketDataPoint {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                value: r.1,
            })
            .collect();
        crate::analysis::align_series(&faith, &market)
    }

    #[test]
    fn insufficient_outcome_has_no_summary() {
        let recs = records(&[(50.0, 1.0), (60.0, 2.0)]);
        assert!(summarize(&recs, &correlate(&recs)).is_none());
    }

    #[test]
    fn strong_positive_relationship_reads_as_such() {
        let recs = records(&[(10.0, 100.0), (20.0, 200.0), (30.0, 310.0), (40.0, 390.0), (50.0, 500.0)]);
        let summary = summarize(&recs, &correlate(&recs)).unwrap();

        assert_eq!(summary.value_level.headline(), "Strong positive correlation");
        assert!(summary.value_level.classification.significant);
        assert!(summary.value_level.explained_variance_pct > 90.0);
        assert_eq!(summary.data.records, 5);
        assert_eq!(summary.data.mean_faith_score, 30.0);
        assert_eq!(summary.findings[0], "Same-day market value shows moderate influence on news sentiment");
        assert_eq!(summary.implications[0], "Market movements influence news sentiment");
        assert_eq!(summary.data.first_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn cohorts_split_at_one_standard_deviation() {
        // faith mean 50, sample std ~32.7 -> high >= 82.7, low <= 17.3
        let split = CohortSplit::from_pairs(&[(10.0, 1.0), (50.0, 2.0), (50.0, 3.0), (90.0, 4.0)]).unwrap();
        assert!((split.faith_mean - 50.0).abs() < 1e-12);
        assert_eq!(split.high, Some(Cohort { days: 1, mean: 4.0 }));
        assert_eq!(split.low, Some(Cohort { days: 1, mean: 1.0 }));
    }

    #[test]
    fn empty_cohorts_are_omitted() {
        // mean 57.5, std 15: nothing at or below 42.5.
        let split = CohortSplit::from_pairs(&[(50.0, 1.0), (50.0, 2.0), (50.0, 3.0), (80.0, 9.0)]).unwrap();
        assert!(split.high.is_some());
        assert_eq!(split.low, None);
        assert!(CohortSplit::from_pairs(&[(50.0, 1.0)]).is_none());
    }

    #[test]
    fn change_cohorts_only_use_rows_with_a_change() {
        let recs = records(&[(90.0, 100.0), (10.0, 110.0), (50.0, 99.0), (50.0, 99.0), (90.0, 108.9)]);
        let report = CohortReport::from_records(&recs);

        let change = report.change.unwrap();
        // faith over rows 2..5: 10, 50, 50, 90
        assert!((change.faith_mean - 50.0).abs() < 1e-12);
        let high = change.high.unwrap();
        assert_eq!(high.days, 1);
        assert!((high.mean - 10.0).abs() < 1e-9);
        let low = change.low.unwrap();
        assert!((low.mean - 10.0).abs() < 1e-9);
        // all rows: mean 58, std ~33.5; both 90s fall short of the high threshold
        let value = report.value.unwrap();
        assert_eq!(value.high, None);
        assert_eq!(value.low, Some(Cohort { days: 1, mean: 110.0 }));
    }
}
