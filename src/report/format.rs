//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring/statistics code stays clean and testable
//! - output changes are localized

use crate::data::CollectionStats;
use crate::domain::{AnalysisResult, CorrelationOutcome, CorrelationResult, MarketSeries};
use crate::math::mean;
use crate::report::{CohortSplit, Narrative, Summary};
use crate::sentiment::ScoredDays;

/// Per-day article counts, keyword hits and faith scores.
pub fn format_daily_sentiment(scored: &ScoredDays) -> String {
    let mut out = String::new();
    out.push_str("Daily sentiment:\n");
    out.push_str(&format!(
        "{:<10} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
        "date", "articles", "positive", "negative", "neutral", "faith"
    ));
    out.push_str(&format!(
        "{:-<10} {:-<8} {:-<8} {:-<8} {:-<8} {:-<8}\n",
        "", "", "", "", "", ""
    ));
    for (day, score) in scored.diagnostics.iter().zip(&scored.scores) {
        out.push_str(&format!(
            "{:<10} {:>8} {:>8} {:>8} {:>8} {:>8.2}\n",
            day.date, day.total_articles, day.positive_count, day.negative_count, day.neutral_count, score.score
        ));
    }

    let values: Vec<f64> = scored.scores.iter().map(|s| s.score).collect();
    if let Some(avg) = mean(&values) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        out.push_str(&format!(
            "\nDays with data: {} | faith avg={avg:.2} min={min:.2} max={max:.2}\n",
            values.len()
        ));
    }
    out
}

pub fn format_collection_stats(stats: &CollectionStats) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Collection: days={} queries={} (failed {}) matched={}\n",
        stats.days_scanned, stats.queries_issued, stats.queries_failed, stats.matched
    ));
    out.push_str(&format!(
        "Dropped: malformed={} off-day={} duplicates={} missing-url={}\n",
        stats.malformed_dropped, stats.off_day_dropped, stats.duplicates_dropped, stats.missing_url_dropped
    ));
    if let Some(day) = stats.stopped_early_at {
        out.push_str(&format!("Stopped early at {day}: no articles for consecutive days\n"));
    }
    out
}

/// Current / average / range / window change of a market series.
pub fn format_market_summary(series: &MarketSeries) -> String {
    let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
    let (Some(first), Some(last), Some(avg)) = (values.first(), values.last(), mean(&values)) else {
        return format!("{}: no data\n", series.label);
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut out = String::new();
    out.push_str(&format!("{} ({} days):\n", series.label, values.len()));
    out.push_str(&format!("Current: {}\n", fmt_usd(*last)));
    out.push_str(&format!("Average: {}\n", fmt_usd(avg)));
    out.push_str(&format!("Min: {}\n", fmt_usd(min)));
    out.push_str(&format!("Max: {}\n", fmt_usd(max)));
    if *first > 0.0 {
        out.push_str(&format!("Change: {:+.2}%\n", (last - first) / first * 100.0));
    }
    out
}

/// Pearson / Spearman / R² for both analyses.
pub fn format_correlations(outcome: &CorrelationOutcome) -> String {
    match outcome {
        CorrelationOutcome::Insufficient { available, required } => format!(
            "Not enough data for correlation analysis ({available} aligned days, need {required}).\n"
        ),
        CorrelationOutcome::Computed(report) => {
            let mut out = String::new();
            for analysis in [&report.value_level, &report.change_level] {
                out.push_str(&format_analysis(analysis));
                out.push('\n');
            }
            out
        }
    }
}

fn format_analysis(analysis: &AnalysisResult) -> String {
    format!(
        "Correlation: same-day {} -> faith score (n={})\n  Pearson: {}\n  Spearman: {}\n  R²: {}\n",
        analysis.kind.display_name().to_lowercase(),
        analysis.n,
        fmt_result(&analysis.pearson),
        fmt_result(&analysis.spearman),
        fmt_stat(analysis.r_squared()),
    )
}

/// The full narrative summary.
pub fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&"=".repeat(60));
    out.push_str("\nNEWS SENTIMENT CORRELATION ANALYSIS SUMMARY\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');

    let data = &summary.data;
    out.push_str("\nAnalysis setup:\n");
    out.push_str("- Same-day market value vs news sentiment\n");
    out.push_str(&format!("- Period: {} to {}\n", data.first_date, data.last_date));
    out.push_str(&format!("- Aligned days: {}\n", data.records));
    out.push_str(&format!("- Average faith score: {:.2}\n", data.mean_faith_score));
    out.push_str(&format!("- Average market value: {}\n", fmt_usd(data.mean_market_value)));

    out.push_str("\nCorrelation analysis:\n");
    for narrative in [&summary.value_level, &summary.change_level] {
        out.push_str(&format_narrative(narrative));
    }

    out.push_str("\nOverall assessment:\n");
    push_bullets(&mut out, &summary.assessment);

    out.push_str("\nCohorts:\n");
    match &summary.cohorts.value {
        Some(split) => out.push_str(&format_cohorts(split, "market value", fmt_usd)),
        None => out.push_str("  (not enough days for value cohorts)\n"),
    }
    match &summary.cohorts.change {
        Some(split) => out.push_str(&format_cohorts(split, "market change", |v| format!("{v:+.2}%"))),
        None => out.push_str("  (not enough days for change cohorts)\n"),
    }

    out.push_str("\nKey findings:\n");
    push_bullets(&mut out, &summary.findings);
    out.push_str("\nImplications:\n");
    push_bullets(&mut out, &summary.implications);
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out
}

fn format_narrative(narrative: &Narrative) -> String {
    format!(
        "{}:\n  - {}\n  - Explains {:.1}% of faith score variance\n  - Statistically significant: {}\n",
        narrative.kind.display_name(),
        narrative.headline(),
        narrative.explained_variance_pct,
        if narrative.classification.significant { "Yes" } else { "No" },
    )
}

fn format_cohorts(split: &CohortSplit, metric: &str, fmt: impl Fn(f64) -> String) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  High faith (>= {:.1}): {} days",
        split.high_threshold,
        split.high.map_or(0, |c| c.days)
    ));
    if let Some(high) = split.high {
        out.push_str(&format!(", average {metric} {}", fmt(high.mean)));
    }
    out.push('\n');
    out.push_str(&format!(
        "  Low faith (<= {:.1}): {} days",
        split.low_threshold,
        split.low.map_or(0, |c| c.days)
    ));
    if let Some(low) = split.low {
        out.push_str(&format!(", average {metric} {}", fmt(low.mean)));
    }
    out.push('\n');
    out
}

fn push_bullets(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(&format!("- {line}\n"));
    }
}

fn fmt_result(result: &CorrelationResult) -> String {
    format!("{} (p-value: {})", fmt_stat(result.coefficient), fmt_stat(result.p_value))
}

fn fmt_stat(v: f64) -> String {
    if v.is_finite() { format!("{v:.4}") } else { "n/a".to_string() }
}

/// Dollar amount, in trillions above $1T.
pub fn fmt_usd(v: f64) -> String {
    if v.abs() >= 1e12 {
        format!("${:.3}T", v / 1e12)
    } else if v.abs() >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else {
        format!("${v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{AnalysisKind, CorrelationMethod, CorrelationReport, MarketDataPoint};

    fn analysis(kind: AnalysisKind, r: f64, p: f64) -> AnalysisResult {
        AnalysisResult {
            kind,
            n: 10,
            pearson: CorrelationResult::new(CorrelationMethod::Pearson, r, p),
            spearman: CorrelationResult::undefined(CorrelationMethod::Spearman),
        }
    }

    #[test]
    fn usd_formatting_scales() {
        assert_eq!(fmt_usd(2.345e12), "$2.345T");
        assert_eq!(fmt_usd(8.5e9), "$8.50B");
        assert_eq!(fmt_usd(1234.4), "$1234");
    }

    #[test]
    fn insufficient_outcome_formats_a_notice() {
        let txt = format_correlations(&CorrelationOutcome::Insufficient { available: 2, required: 3 });
        assert_eq!(txt, "Not enough data for correlation analysis (2 aligned days, need 3).\n");
    }

    #[test]
    fn correlations_print_both_analyses_with_na_for_undefined() {
        let outcome = CorrelationOutcome::Computed(CorrelationReport {
            value_level: analysis(AnalysisKind::ValueLevel, 0.5, 0.01),
            change_level: analysis(AnalysisKind::ChangeLevel, -0.2, 0.4),
        });
        let txt = format_correlations(&outcome);
        assert!(txt.contains("same-day market value -> faith score (n=10)"));
        assert!(txt.contains("Pearson: 0.5000 (p-value: 0.0100)"));
        assert!(txt.contains("Spearman: n/a (p-value: n/a)"));
        assert!(txt.contains("R²: 0.2500"));
        assert!(txt.contains("R²: 0.0400"));
    }

    #[test]
    fn market_summary_reports_window_change() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let series = MarketSeries::new(
            "Bitcoin Market Cap USD",
            vec![
                MarketDataPoint { date: d(1), value: 1.0e12 },
                MarketDataPoint { date: d(2), value: 1.1e12 },
            ],
        );
        let txt = format_market_summary(&series);
        assert!(txt.starts_with("Bitcoin Market Cap USD (2 days):\n"));
        assert!(txt.contains("Current: $1.100T\n"));
        assert!(txt.contains("Change: +10.00%\n"));
    }
}
