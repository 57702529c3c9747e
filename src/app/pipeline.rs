//! Shared pipeline logic behind the CLI commands.
//!
//! collect: NewsAPI -> collector -> scorer -> per-day faith scores
//! market:  CoinGecko -> single coin or total-market fallback chain
//! analyze: align -> correlate -> summarize (+ trend line for the scatter plot)
//!
//! Sources come in as trait objects so every stage runs against fakes in tests.

use chrono::NaiveDate;
use tracing::info;

use crate::analysis::{align_series, correlate};
use crate::data::market::{CoinHistory, MarketStrategy};
use crate::data::{ArticleCollector, CollectionStats, MarketApi, MarketChain, NewsSource};
use crate::domain::{AlignedRecord, CorrelationOutcome, FaithScore, MarketDataPoint, MarketSeries};
use crate::error::AppError;
use crate::math::{TrendLine, fit_trend_line};
use crate::plot::{render_scatter, render_timeline};
use crate::report::{Summary, summarize};
use crate::sentiment::{ScoredDays, SentimentScorer};

/// Outputs of `faith collect`.
#[derive(Debug, Clone)]
pub struct CollectionRun {
    pub stats: CollectionStats,
    pub scored: ScoredDays,
}

/// Collect the window ending at `today` and score it.
pub fn run_collection(
    collector: &ArticleCollector,
    scorer: &SentimentScorer,
    source: &dyn NewsSource,
    today: NaiveDate,
) -> CollectionRun {
    let collection = collector.collect(source, today);
    let scored = scorer.score(collection.articles);
    CollectionRun {
        stats: collection.stats,
        scored,
    }
}

/// Which market series to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketTarget {
    Coin(String),
    /// Sum of the top coins, falling back to a bitcoin proxy, then a trend estimate.
    Total { top: usize },
}

/// Fetch the requested market series. An empty series is exit code 3.
pub fn fetch_market(api: &dyn MarketApi, target: &MarketTarget, days: u32, today: NaiveDate) -> Result<MarketSeries, AppError> {
    let series = match target {
        MarketTarget::Coin(coin_id) => CoinHistory::new(api, coin_id.as_str()).fetch(days)?,
        MarketTarget::Total { top } => {
            let ok = MarketChain::total_market(api, *top, today)
                .fetch(days)
                .map_err(|exhausted| AppError::new(4, exhausted.to_string()))?;
            info!(strategy = ok.strategy, fallbacks = ok.failures.len(), "total market series built");
            ok.series
        }
    };

    if series.points.is_empty() {
        return Err(AppError::new(3, format!("No market data returned for {}.", series.label)));
    }
    Ok(series)
}

/// All computed outputs of `faith analyze`.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub records: Vec<AlignedRecord>,
    pub outcome: CorrelationOutcome,
    pub summary: Option<Summary>,
    /// OLS fit of faith score on market value, for the scatter plot.
    pub trend: Option<TrendLine>,
}

impl AnalysisRun {
    /// Scatter plot and timeline; `None` unless the correlation was computed.
    pub fn render_plots(&self, width: usize, height: usize) -> Option<String> {
        self.outcome.report()?;
        let mut out = render_scatter(&self.records, self.trend.as_ref(), width, height);
        out.push('\n');
        out.push_str(&render_timeline(&self.records, width, height));
        Some(out)
    }
}

pub fn run_analysis(faith: &[FaithScore], market: &[MarketDataPoint]) -> AnalysisRun {
    let records = align_series(faith, market);
    let outcome = correlate(&records);
    let summary = summarize(&records, &outcome);

    let xs: Vec<f64> = records.iter().map(|r| r.market_value).collect();
    let ys: Vec<f64> = records.iter().map(|r| r.faith_score).collect();
    let trend = fit_trend_line(&xs, &ys);

    AnalysisRun {
        records,
        outcome,
        summary,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use chrono::Days;

    use crate::data::news::{NewsQuery, RawArticle};
    use crate::data::{CollectorConfig, GlobalSnapshot};
    use crate::error::SourceError;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    struct FixedNews {
        by_day: HashMap<NaiveDate, Vec<RawArticle>>,
    }

    impl NewsSource for FixedNews {
        fn fetch_day(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, SourceError> {
            Ok(self.by_day.get(&query.day).cloned().unwrap_or_default())
        }
    }

    fn raw(url: &str, day: NaiveDate, title: &str) -> RawArticle {
        RawArticle {
            url: Some(url.to_string()),
            published_at: Some(format!("{day}T12:00:00Z")),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn collection_scores_deduplicated_articles_per_day() {
        let mut by_day = HashMap::new();
        by_day.insert(date(10), vec![raw("https://a", date(10), "Adoption and trust grow")]);
        by_day.insert(
            date(9),
            vec![raw("https://b", date(9), "Scam exchange fears"), raw("https://c", date(9), "Quiet day")],
        );
        let source = FixedNews { by_day };
        let collector = ArticleCollector::new(CollectorConfig {
            days: 2,
            request_delay: Duration::ZERO,
            ..Default::default()
        });

        let run = run_collection(&collector, &SentimentScorer::default(), &source, date(10));

        // every term returns the same articles; URL dedup keeps one copy each
        assert_eq!(run.stats.duplicates_dropped, 6);
        assert_eq!(run.scored.score_for(date(10)), Some(100.0));
        assert_eq!(run.scored.score_for(date(9)), Some(0.0));
        assert_eq!(run.scored.diagnostics[0].total_articles, 2);
    }

    struct OneCoin {
        points: Vec<MarketDataPoint>,
    }

    impl MarketApi for OneCoin {
        fn top_coin_ids(&self, _limit: usize) -> Result<Vec<String>, SourceError> {
            Err(SourceError::Status(500))
        }

        fn market_caps(&self, coin_id: &str, _days: u32) -> Result<Vec<MarketDataPoint>, SourceError> {
            match coin_id {
                "bitcoin" => Ok(self.points.clone()),
                _ => Err(SourceError::Empty),
            }
        }

        fn global_snapshot(&self) -> Result<GlobalSnapshot, SourceError> {
            Err(SourceError::Status(500))
        }
    }

    #[test]
    fn coin_and_total_targets() {
        let api = OneCoin {
            points: vec![MarketDataPoint { date: date(1), value: 10.0 }],
        };

        let coin = fetch_market(&api, &MarketTarget::Coin("bitcoin".into()), 30, date(1)).unwrap();
        assert_eq!(coin.label, "Bitcoin Market Cap USD");

        let total = fetch_market(&api, &MarketTarget::Total { top: 10 }, 30, date(1)).unwrap();
        assert_eq!(total.points[0].value, 25.0);

        let err = fetch_market(&api, &MarketTarget::Coin("dogecoin".into()), 30, date(1)).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn empty_coin_history_is_no_data() {
        let api = OneCoin { points: Vec::new() };
        let err = fetch_market(&api, &MarketTarget::Coin("bitcoin".into()), 30, date(1)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn analysis_runs_end_to_end() {
        let faith: Vec<FaithScore> = [40.0, 55.0, 50.0, 70.0, 65.0]
            .iter()
            .enumerate()
            .map(|(i, &score)| FaithScore {
                date: date(1).checked_add_days(Days::new(i as u64)).unwrap(),
                score,
            })
            .collect();
        let market: Vec<MarketDataPoint> = [1.0e12, 1.1e12, 1.05e12, 1.3e12, 1.2e12]
            .iter()
            .enumerate()
            .map(|(i, &value)| MarketDataPoint {
                date: date(1).checked_add_days(Days::new(i as u64)).unwrap(),
                value,
            })
            .collect();

        let run = run_analysis(&faith, &market);
        assert_eq!(run.records.len(), 5);
        let report = run.outcome.report().unwrap();
        assert!(report.value_level.pearson.coefficient > 0.9);
        assert!(run.summary.is_some());
        assert!(run.trend.unwrap().slope > 0.0);

        let plots = run.render_plots(40, 10).unwrap();
        assert!(plots.starts_with("Plot: market value="));
        assert!(plots.contains("\nTimeline: 2024-05-01..2024-05-05"));
    }

    #[test]
    fn two_aligned_days_are_not_plotted() {
        let faith: Vec<FaithScore> = [(1, 30.0), (2, 70.0), (4, 50.0)]
            .iter()
            .map(|&(d, score)| FaithScore { date: date(d), score })
            .collect();
        let market: Vec<MarketDataPoint> = [(1, 1.0e12), (2, 1.2e12), (3, 1.1e12)]
            .iter()
            .map(|&(d, value)| MarketDataPoint { date: date(d), value })
            .collect();

        let run = run_analysis(&faith, &market);
        assert_eq!(run.records.len(), 2);
        assert!(run.summary.is_none());
        assert_eq!(run.render_plots(40, 10), None);
    }

    #[test]
    fn short_overlap_is_insufficient_without_summary() {
        let faith = vec![FaithScore { date: date(1), score: 50.0 }];
        let market = vec![MarketDataPoint { date: date(1), value: 1.0 }];
        let run = run_analysis(&faith, &market);
        assert_eq!(run.outcome, CorrelationOutcome::Insufficient { available: 1, required: 3 });
        assert!(run.summary.is_none());
        assert!(run.trend.is_none());
    }
}
