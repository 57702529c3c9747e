//! Day-by-day article collection with deduplication.
//!
//! Walks the window from `today` backwards, issuing one query per search term per
//! day. Only articles whose UTC publish date equals the queried day are kept.
//! A failed query or a malformed record is logged, counted, and skipped.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::news::{NewsQuery, NewsSource};
use crate::domain::Article;

/// Settings for one collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Primary search term.
    pub query: String,
    pub language: String,
    /// Number of calendar days to cover, counting today.
    pub days: u32,
    /// Extra terms queried after the primary term, in order.
    pub auxiliary_terms: Vec<String>,
    /// Stop once more than this many consecutive days yield nothing.
    pub empty_day_lookback: u32,
    /// Pause after each query.
    pub request_delay: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            query: "cryptocurrency".to_string(),
            language: "en".to_string(),
            days: 30,
            auxiliary_terms: vec!["bitcoin".to_string(), "crypto".to_string()],
            empty_day_lookback: 5,
            request_delay: Duration::from_millis(300),
        }
    }
}

impl CollectorConfig {
    /// Primary term followed by the auxiliary terms.
    pub fn search_terms(&self) -> Vec<&str> {
        std::iter::once(self.query.as_str())
            .chain(self.auxiliary_terms.iter().map(String::as_str))
            .collect()
    }
}

/// Counters describing what happened during collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub days_scanned: u32,
    pub queries_issued: u32,
    pub queries_failed: u32,
    pub malformed_dropped: u32,
    pub off_day_dropped: u32,
    pub matched: u32,
    pub missing_url_dropped: u32,
    pub duplicates_dropped: u32,
    /// Day on which collection stopped because the corpus looked exhausted.
    pub stopped_early_at: Option<NaiveDate>,
}

/// Deduplicated articles in discovery order, plus run counters.
#[derive(Debug, Clone)]
pub struct Collection {
    pub articles: Vec<Article>,
    pub stats: CollectionStats,
}

pub struct ArticleCollector {
    config: CollectorConfig,
}

impl ArticleCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// Collect articles for `today` and the `days - 1` days before it.
    pub fn collect(&self, source: &dyn NewsSource, today: NaiveDate) -> Collection {
        let mut stats = CollectionStats::default();
        let mut gathered = Vec::new();
        let mut consecutive_empty = 0u32;
        let terms = self.config.search_terms();

        for offset in 0..self.config.days {
            let Some(day) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };
            stats.days_scanned += 1;

            let mut day_matches = 0u32;
            let mut day_answered = false;
            for term in &terms {
                let query = NewsQuery {
                    term: term.to_string(),
                    language: self.config.language.clone(),
                    day,
                };
                stats.queries_issued += 1;
                let records = match source.fetch_day(&query) {
                    Ok(records) => records,
                    Err(err) => {
                        stats.queries_failed += 1;
                        warn!(%day, term, error = %err, "news query failed; skipping");
                        continue;
                    }
                };
                day_answered = true;

                let mut term_matches = 0u32;
                for raw in records {
                    let article = match raw.into_article() {
                        Ok(article) => article,
                        Err(err) => {
                            stats.malformed_dropped += 1;
                            debug!(%day, term, error = %err, "dropping malformed article");
                            continue;
                        }
                    };
                    if article.published_date() != day {
                        stats.off_day_dropped += 1;
                        continue;
                    }
                    term_matches += 1;
                    gathered.push(article);
                }

                if term_matches > 0 {
                    debug!(%day, term, articles = term_matches, "matched articles");
                }
                day_matches += term_matches;

                if !self.config.request_delay.is_zero() {
                    std::thread::sleep(self.config.request_delay);
                }
            }
            stats.matched += day_matches;

            if !day_answered {
                // An unreachable source says nothing about the corpus.
                debug!(%day, "every query failed; empty-day streak unchanged");
            } else if day_matches == 0 {
                consecutive_empty += 1;
                if consecutive_empty > self.config.empty_day_lookback {
                    info!(%day, empty_days = consecutive_empty, "no articles for consecutive days; stopping early");
                    stats.stopped_early_at = Some(day);
                    break;
                }
            } else {
                consecutive_empty = 0;
            }
        }

        let articles = dedupe_by_url(gathered, &mut stats);
        info!(
            unique = articles.len(),
            days = stats.days_scanned,
            failed_queries = stats.queries_failed,
            "article collection finished"
        );
        Collection { articles, stats }
    }
}

/// Keep the first article per url, preserving order; drop articles without a url.
pub fn dedupe_by_url(articles: Vec<Article>, stats: &mut CollectionStats) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(articles.len());
    for article in articles {
        if !article.has_url() {
            stats.missing_url_dropped += 1;
            continue;
        }
        if seen.insert(article.url.clone()) {
            out.push(article);
        } else {
            stats.duplicates_dropped += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};

    use crate::data::news::RawArticle;
    use crate::error::SourceError;

    /// In-memory news source keyed by (term, day).
    #[derive(Default)]
    struct FakeSource {
        responses: HashMap<(String, NaiveDate), Result<Vec<RawArticle>, SourceError>>,
        calls: RefCell<Vec<(String, NaiveDate)>>,
    }

    impl FakeSource {
        fn with(mut self, term: &str, day: NaiveDate, resp: Result<Vec<RawArticle>, SourceError>) -> Self {
            self.responses.insert((term.to_string(), day), resp);
            self
        }
    }

    impl NewsSource for FakeSource {
        fn fetch_day(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, SourceError> {
            self.calls.borrow_mut().push((query.term.clone(), query.day));
            self.responses
                .get(&(query.term.clone(), query.day))
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(url: &str, published: &str) -> RawArticle {
        RawArticle {
            url: Some(url.to_string()),
            published_at: Some(published.to_string()),
            title: Some("title".to_string()),
            description: Some("description".to_string()),
        }
    }

    fn article(url: &str) -> Article {
        Article {
            url: url.to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: String::new(),
            description: String::new(),
        }
    }

    fn quiet(days: u32) -> CollectorConfig {
        CollectorConfig {
            days,
            request_delay: Duration::ZERO,
            ..CollectorConfig::default()
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_and_drops_missing_urls() {
        // 3 url groups, 2 extra duplicates, 2 articles without url.
        let mut first_a = article("a");
        first_a.title = "first".to_string();
        let input = vec![
            first_a,
            article("b"),
            article(""),
            article("a"),
            article("c"),
            article("  "),
            article("b"),
        ];
        let mut stats = CollectionStats::default();
        let out = dedupe_by_url(input, &mut stats);

        let urls: Vec<_> = out.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
        assert_eq!(out[0].title, "first");
        assert_eq!(stats.missing_url_dropped, 2);
        assert_eq!(stats.duplicates_dropped, 2);
    }

    #[test]
    fn queries_days_descending_with_terms_in_order() {
        let source = FakeSource::default().with(
            "cryptocurrency",
            date(2024, 1, 3),
            Ok(vec![raw("x", "2024-01-03T09:00:00Z")]),
        );
        let collector = ArticleCollector::new(quiet(2));
        collector.collect(&source, date(2024, 1, 3));

        let calls = source.calls.borrow();
        let expected: Vec<(String, NaiveDate)> = vec![
            ("cryptocurrency".into(), date(2024, 1, 3)),
            ("bitcoin".into(), date(2024, 1, 3)),
            ("crypto".into(), date(2024, 1, 3)),
            ("cryptocurrency".into(), date(2024, 1, 2)),
            ("bitcoin".into(), date(2024, 1, 2)),
            ("crypto".into(), date(2024, 1, 2)),
        ];
        assert_eq!(*calls, expected);
    }

    #[test]
    fn filters_off_day_and_malformed_records() {
        let day = date(2024, 1, 3);
        let mut no_date = raw("nd", "");
        no_date.published_at = None;
        let source = FakeSource::default().with(
            "cryptocurrency",
            day,
            Ok(vec![
                raw("keep", "2024-01-03T12:00:00Z"),
                raw("skew", "2024-01-02T12:00:00Z"),
                raw("bad", "not-a-date"),
                no_date,
            ]),
        );
        let collection = ArticleCollector::new(quiet(1)).collect(&source, day);

        assert_eq!(collection.articles.len(), 1);
        assert_eq!(collection.articles[0].url, "keep");
        assert_eq!(collection.stats.off_day_dropped, 1);
        assert_eq!(collection.stats.malformed_dropped, 2);
    }

    #[test]
    fn failed_query_is_skipped_without_aborting() {
        let day = date(2024, 1, 3);
        let source = FakeSource::default()
            .with("cryptocurrency", day, Err(SourceError::Request("timeout".into())))
            .with("bitcoin", day, Ok(vec![raw("b", "2024-01-03T01:00:00Z")]));
        let collection = ArticleCollector::new(quiet(1)).collect(&source, day);

        assert_eq!(collection.stats.queries_failed, 1);
        assert_eq!(collection.stats.queries_issued, 3);
        assert_eq!(collection.articles.len(), 1);
    }

    #[test]
    fn stops_after_lookback_consecutive_empty_days() {
        let today = date(2024, 1, 31);
        let source = FakeSource::default()
            .with("bitcoin", today, Ok(vec![raw("t", "2024-01-31T01:00:00Z")]))
            // Never reached: the six empty days in between end collection.
            .with("bitcoin", date(2024, 1, 20), Ok(vec![raw("old", "2024-01-20T01:00:00Z")]));
        let collection = ArticleCollector::new(quiet(30)).collect(&source, today);

        assert_eq!(collection.stats.days_scanned, 7);
        assert_eq!(collection.stats.stopped_early_at, Some(date(2024, 1, 25)));
        assert_eq!(collection.articles.len(), 1);
    }

    struct DownSource;

    impl NewsSource for DownSource {
        fn fetch_day(&self, _query: &NewsQuery) -> Result<Vec<RawArticle>, SourceError> {
            Err(SourceError::Status(429))
        }
    }

    #[test]
    fn outage_days_do_not_count_toward_early_stop() {
        let collection = ArticleCollector::new(quiet(30)).collect(&DownSource, date(2024, 1, 31));

        assert_eq!(collection.stats.days_scanned, 30);
        assert_eq!(collection.stats.queries_failed, 90);
        assert_eq!(collection.stats.stopped_early_at, None);
        assert!(collection.articles.is_empty());
    }

    #[test]
    fn failed_days_neither_extend_nor_reset_the_empty_streak() {
        let today = date(2024, 1, 31);
        // Days 31..=27 answer empty (5), 26 fails outright, 25 answers empty (6th) -> stop.
        let mut source = FakeSource::default();
        for term in ["cryptocurrency", "bitcoin", "crypto"] {
            source = source.with(term, date(2024, 1, 26), Err(SourceError::Status(503)));
        }
        let collection = ArticleCollector::new(quiet(30)).collect(&source, today);

        assert_eq!(collection.stats.days_scanned, 7);
        assert_eq!(collection.stats.queries_failed, 3);
        assert_eq!(collection.stats.stopped_early_at, Some(date(2024, 1, 25)));
    }

    #[test]
    fn empty_streak_resets_on_a_productive_day() {
        let today = date(2024, 1, 31);
        let source = FakeSource::default()
            .with("crypto", date(2024, 1, 26), Ok(vec![raw("mid", "2024-01-26T01:00:00Z")]));
        let collection = ArticleCollector::new(quiet(10)).collect(&source, today);

        // 5 empty days, one hit, then 4 more empty days: never more than 5 in a row.
        assert_eq!(collection.stats.days_scanned, 10);
        assert_eq!(collection.stats.stopped_early_at, None);
        assert_eq!(collection.articles.len(), 1);
    }

    #[test]
    fn duplicate_hits_across_terms_collapse() {
        let day = date(2024, 1, 3);
        let hit = || Ok(vec![raw("same", "2024-01-03T05:00:00Z")]);
        let source = FakeSource::default()
            .with("cryptocurrency", day, hit())
            .with("bitcoin", day, hit())
            .with("crypto", day, hit());
        let collection = ArticleCollector::new(quiet(1)).collect(&source, day);

        assert_eq!(collection.stats.matched, 3);
        assert_eq!(collection.stats.duplicates_dropped, 2);
        assert_eq!(collection.articles.len(), 1);
    }
}
