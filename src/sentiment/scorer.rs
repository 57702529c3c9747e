//! Keyword scoring and daily aggregation.
//!
//! Articles are consumed once: each contributes its keyword hits to the
//! `DailySentiment` row of its UTC publish date and is then dropped. The finished
//! table is frozen into a `ScoredDays` value that later stages read.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{Article, DailySentiment, FaithScore, KeywordCounts};
use crate::sentiment::Vocabulary;

/// Scores articles against a vocabulary.
#[derive(Debug, Clone, Default)]
pub struct SentimentScorer {
    vocabulary: Vocabulary,
}

impl SentimentScorer {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Keyword hits for one article (title + description).
    pub fn score_article(&self, article: &Article) -> KeywordCounts {
        self.vocabulary.count(&article.text())
    }

    /// Aggregate articles into per-day sentiment and finalize the faith scores.
    pub fn score<I>(&self, articles: I) -> ScoredDays
    where
        I: IntoIterator<Item = Article>,
    {
        let mut table = SentimentTable::default();
        for article in articles {
            let counts = self.score_article(&article);
            table.record(article.published_date(), counts);
        }
        let scored = table.finalize();
        info!(days = scored.len(), "scored daily sentiment");
        scored
    }
}

/// Ordered per-date accumulator, owned by a single aggregation pass.
#[derive(Debug, Default)]
pub struct SentimentTable {
    days: BTreeMap<NaiveDate, DailySentiment>,
}

impl SentimentTable {
    pub fn record(&mut self, date: NaiveDate, counts: KeywordCounts) {
        self.days
            .entry(date)
            .or_insert_with(|| DailySentiment::new(date))
            .add(counts);
    }

    /// Freeze the table and compute one faith score per date.
    pub fn finalize(self) -> ScoredDays {
        let diagnostics: Vec<DailySentiment> = self.days.into_values().collect();
        let scores = diagnostics
            .iter()
            .map(|day| {
                let score = day.faith_score();
                debug!(
                    date = %day.date,
                    articles = day.total_articles,
                    positive = day.positive_count,
                    negative = day.negative_count,
                    neutral = day.neutral_count,
                    faith = score.score,
                    "daily sentiment"
                );
                score
            })
            .collect();
        ScoredDays { scores, diagnostics }
    }
}

/// Finalized scores plus the counts they were computed from, both ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDays {
    pub scores: Vec<FaithScore>,
    pub diagnostics: Vec<DailySentiment>,
}

impl ScoredDays {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn score_for(&self, date: NaiveDate) -> Option<f64> {
        self.scores.iter().find(|s| s.date == date).map(|s| s.score)
    }

    /// `(date, score)` rows for persistence.
    pub fn rows(&self) -> Vec<(NaiveDate, f64)> {
        self.scores.iter().map(|s| (s.date, s.score)).collect()
    }
}
