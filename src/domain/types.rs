//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - handed between pipeline stages by value
//! - exported to JSON/CSV
//! - reloaded later for analysis runs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Faith score assigned to a day without any keyword hits.
pub const NEUTRAL_FAITH_SCORE: f64 = 50.0;

/// A collected news article.
///
/// `url` is the deduplication key; an empty url marks an article that is
/// dropped during deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

impl Article {
    /// UTC calendar date the article was published on.
    pub fn published_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    /// Text that keyword matching runs against.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Keyword hits for a single piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCounts {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

/// Per-day accumulator of keyword hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub positive_count: u64,
    pub negative_count: u64,
    pub neutral_count: u64,
    pub total_articles: u64,
}

impl DailySentiment {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            total_articles: 0,
        }
    }

    /// Fold one article's keyword hits into the day.
    pub fn add(&mut self, counts: KeywordCounts) {
        self.positive_count += u64::from(counts.positive);
        self.negative_count += u64::from(counts.negative);
        self.neutral_count += u64::from(counts.neutral);
        self.total_articles += 1;
    }

    pub fn total_hits(&self) -> u64 {
        self.positive_count + self.negative_count + self.neutral_count
    }

    /// Hit-weighted average: positive weighs 100, neutral 50, negative 0.
    ///
    /// Negative hits only enter the denominator.
    pub fn faith_score(&self) -> FaithScore {
        let total = self.total_hits();
        let score = if total == 0 {
            NEUTRAL_FAITH_SCORE
        } else {
            let weighted = self.positive_count as f64 * 100.0
                + self.negative_count as f64 * 0.0
                + self.neutral_count as f64 * 50.0;
            weighted / total as f64
        };
        FaithScore {
            date: self.date,
            score: score.clamp(0.0, 100.0),
        }
    }
}

/// Daily sentiment score in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaithScore {
    pub date: NaiveDate,
    pub score: f64,
}

/// One day of market valuation (USD).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketDataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A named market series, e.g. "Bitcoin Market Cap USD".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSeries {
    pub label: String,
    pub points: Vec<MarketDataPoint>,
}

impl MarketSeries {
    pub fn new(label: impl Into<String>, points: Vec<MarketDataPoint>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// Faith score and market value observed on the same calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub date: NaiveDate,
    pub faith_score: f64,
    pub market_value: f64,
    /// Percent change versus the previous aligned row; `None` on the first row.
    pub market_value_pct_change: Option<f64>,
}

/// Which pair of series an analysis correlates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Faith score vs market value.
    ValueLevel,
    /// Faith score vs day-over-day market value change.
    ChangeLevel,
}

impl AnalysisKind {
    pub fn display_name(self) -> &'static str {
        match self {
            AnalysisKind::ValueLevel => "Market Value",
            AnalysisKind::ChangeLevel => "Market Change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

/// One correlation coefficient with its two-sided p-value.
///
/// Undefined statistics (constant input) are stored as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub method: CorrelationMethod,
    pub coefficient: f64,
    pub p_value: f64,
    pub r_squared: f64,
}

impl CorrelationResult {
    pub fn new(method: CorrelationMethod, coefficient: f64, p_value: f64) -> Self {
        Self {
            method,
            coefficient,
            p_value,
            r_squared: coefficient * coefficient,
        }
    }

    pub fn undefined(method: CorrelationMethod) -> Self {
        Self::new(method, f64::NAN, f64::NAN)
    }

    pub fn is_defined(&self) -> bool {
        self.coefficient.is_finite()
    }
}

/// Pearson + Spearman over one pair of series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub kind: AnalysisKind,
    /// Number of paired observations.
    pub n: usize,
    pub pearson: CorrelationResult,
    pub spearman: CorrelationResult,
}

impl AnalysisResult {
    /// Share of faith score variance associated with the market series (Pearson r²).
    pub fn r_squared(&self) -> f64 {
        self.pearson.r_squared
    }
}

/// Both analyses of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub value_level: AnalysisResult,
    pub change_level: AnalysisResult,
}

/// Correlation engine output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Computed(CorrelationReport),
    /// Fewer aligned records than the engine needs.
    Insufficient { available: usize, required: usize },
}

impl CorrelationOutcome {
    pub fn report(&self) -> Option<&CorrelationReport> {
        match self {
            CorrelationOutcome::Computed(report) => Some(report),
            CorrelationOutcome::Insufficient { .. } => None,
        }
    }
}
