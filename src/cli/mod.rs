//! Command-line parsing for the `faith` binary.
//!
//! Argument parsing and command dispatch stay separate from the scoring and
//! statistics code; `app` turns these structs into pipeline settings.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "faith", version, about = "Crypto news faith score vs market value correlation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect news for the window, score each day, and write the faith score table.
    Collect(CollectArgs),
    /// Fetch a daily market value series and write it as a table.
    Market(MarketArgs),
    /// Align faith scores with market values, correlate, and print the summary.
    Analyze(AnalyzeArgs),
    /// Print the active keyword vocabulary as JSON (a template for custom lists).
    Vocabulary(VocabularyArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CollectArgs {
    /// Days to cover, counting today (UTC).
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Primary search term.
    #[arg(short = 'q', long, default_value = "cryptocurrency")]
    pub query: String,

    /// Extra search terms, queried after the primary term.
    #[arg(long = "aux-term", default_values_t = vec!["bitcoin".to_string(), "crypto".to_string()])]
    pub aux_terms: Vec<String>,

    /// Article language.
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Stop after more than this many consecutive days without articles.
    #[arg(long, default_value_t = 5)]
    pub lookback: u32,

    /// Pause between queries (milliseconds).
    #[arg(long, default_value_t = 300)]
    pub delay_ms: u64,

    /// Articles per request (NewsAPI caps this at 100).
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,

    /// Result pages fetched per query.
    #[arg(long, default_value_t = 1)]
    pub max_pages: u32,

    /// Keyword vocabulary JSON (`positive`, `negative`, `neutral` arrays).
    #[arg(long, value_name = "JSON")]
    pub vocabulary: Option<PathBuf>,

    /// Faith score table to write.
    #[arg(short = 'o', long, default_value = "daily_faith_scores.csv")]
    pub output: PathBuf,

    /// Also write collection counters as JSON.
    #[arg(long, value_name = "JSON")]
    pub stats_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct MarketArgs {
    /// CoinGecko coin id for a single-coin series.
    #[arg(long, default_value = "bitcoin", conflicts_with = "total")]
    pub coin: String,

    /// Total market value instead: top coins summed, with fallbacks.
    #[arg(long)]
    pub total: bool,

    /// Number of top coins summed with `--total`.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Days of history.
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Market table to write.
    #[arg(short = 'o', long, default_value = "bitcoin_market_cap_monthly.csv")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Faith score table produced by `faith collect`.
    #[arg(long, default_value = "daily_faith_scores.csv")]
    pub faith: PathBuf,

    /// Market table produced by `faith market`.
    #[arg(long, default_value = "bitcoin_market_cap_monthly.csv")]
    pub market: PathBuf,

    /// Export aligned rows to CSV.
    #[arg(long, default_value = "news_predictive_analysis_data.csv")]
    pub export: PathBuf,

    /// Skip the aligned-rows CSV export.
    #[arg(long)]
    pub no_export: bool,

    /// Export rows, correlations and summary to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct VocabularyArgs {
    /// Validate and print this vocabulary file instead of the built-in lists.
    #[arg(long, value_name = "JSON")]
    pub file: Option<PathBuf>,
}
