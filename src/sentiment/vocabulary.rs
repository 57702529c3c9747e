//! Keyword vocabularies for sentiment scoring.
//!
//! The vocabulary is plain input data: the built-in lists below, or a JSON file
//! of the same shape:
//!
//! ```text
//! { "positive": ["trust", ...], "negative": ["scam", ...], "neutral": ["hold", ...] }
//! ```
//!
//! Keywords are stored lowercase; the three sets must be disjoint.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::KeywordCounts;
use crate::error::AppError;

const DEFAULT_POSITIVE: &[&str] = &[
    "trust",
    "faith",
    "confidence",
    "adoption",
    "mainstream",
    "institutional",
    "secure",
    "reliable",
    "future",
    "revolutionary",
    "breakthrough",
    "innovation",
    "legitimate",
    "accepted",
    "embraced",
];

const DEFAULT_NEGATIVE: &[&str] = &[
    "distrust",
    "doubt",
    "skepticism",
    "scam",
    "fraud",
    "bubble",
    "risky",
    "volatile",
    "unreliable",
    "suspicious",
    "questionable",
    "doubtful",
    "uncertain",
    "wary",
    "cautious",
];

const DEFAULT_NEUTRAL: &[&str] = &[
    "stable",
    "hold",
    "consolidate",
    "sideways",
    "mixed",
    "divided",
    "debate",
    "discussion",
    "analysis",
    "evaluation",
    "assessment",
];

/// Positive / negative / neutral keyword sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    positive: Vec<String>,
    negative: Vec<String>,
    neutral: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let owned = |words: &[&str]| -> Vec<String> { words.iter().map(|w| w.to_string()).collect() };
        Self {
            positive: owned(DEFAULT_POSITIVE),
            negative: owned(DEFAULT_NEGATIVE),
            neutral: owned(DEFAULT_NEUTRAL),
        }
    }
}

impl Vocabulary {
    /// Build a vocabulary, normalizing to lowercase and removing repeats.
    pub fn new(positive: Vec<String>, negative: Vec<String>, neutral: Vec<String>) -> Result<Self, AppError> {
        let vocab = Self {
            positive: normalize(positive),
            negative: normalize(negative),
            neutral: normalize(neutral),
        };
        vocab.validate()?;
        Ok(vocab)
    }

    /// Load a vocabulary JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::new(2, format!("Failed to open vocabulary '{}': {e}", path.display())))?;
        let raw: Vocabulary = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid vocabulary JSON '{}': {e}", path.display())))?;
        Self::new(raw.positive, raw.negative, raw.neutral)
    }

    pub fn to_json_pretty(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::new(2, format!("Failed to serialize vocabulary: {e}")))
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }

    pub fn neutral(&self) -> &[String] {
        &self.neutral
    }

    /// Count keyword hits in `text`.
    ///
    /// Matching is case-insensitive substring containment; each keyword counts at
    /// most once no matter how often it appears.
    pub fn count(&self, text: &str) -> KeywordCounts {
        let lower = text.to_lowercase();
        let hits = |words: &[String]| words.iter().filter(|w| lower.contains(w.as_str())).count() as u32;
        KeywordCounts {
            positive: hits(&self.positive),
            negative: hits(&self.negative),
            neutral: hits(&self.neutral),
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        let sets = [
            ("positive", &self.positive),
            ("negative", &self.negative),
            ("neutral", &self.neutral),
        ];
        for (name, words) in &sets {
            if words.is_empty() {
                return Err(AppError::new(2, format!("Vocabulary set '{name}' is empty.")));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (name, words) in &sets {
            for word in words.iter() {
                if !seen.insert(word.as_str()) {
                    return Err(AppError::new(
                        2,
                        format!("Keyword '{word}' in '{name}' also appears in another vocabulary set."),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn normalize(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.clone()))
        .collect()
}
