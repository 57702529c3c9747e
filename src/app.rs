//! Top-level application orchestration.
//!
//! `src/main.rs` is tiny; this module is the real main:
//! - installs logging (stderr, `RUST_LOG` overrides `faith_signal=info`)
//! - parses CLI arguments
//! - builds clients from the environment
//! - runs the pipeline for the chosen command
//! - prints reports/plots to stdout and writes tables/exports

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalyzeArgs, CollectArgs, Command, MarketArgs, VocabularyArgs};
use crate::config::Settings;
use crate::data::{ArticleCollector, CollectorConfig};
use crate::error::AppError;
use crate::io::{AnalysisExport, FAITH_SCORE_COLUMN, read_series_csv, write_aligned_csv, write_report_json, write_series_csv};
use crate::sentiment::{SentimentScorer, Vocabulary};

pub mod pipeline;

use pipeline::MarketTarget;

/// Entry point for the `faith` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Collect(args) => handle_collect(args),
        Command::Market(args) => handle_market(args),
        Command::Analyze(args) => handle_analyze(args),
        Command::Vocabulary(args) => handle_vocabulary(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("faith_signal=info"));
    // stdout carries the reports
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_collect(args: CollectArgs) -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let vocabulary = load_vocabulary(args.vocabulary.as_deref())?;
    let source = settings.news_client()?.with_paging(args.page_size, args.max_pages);
    let collector = ArticleCollector::new(collector_config_from_args(&args));
    let scorer = SentimentScorer::new(vocabulary);

    let today = Utc::now().date_naive();
    info!(%today, days = args.days, query = %args.query, "collecting news");
    let run = pipeline::run_collection(&collector, &scorer, &source, today);

    println!("{}", crate::report::format_collection_stats(&run.stats));
    if run.scored.is_empty() {
        return Err(AppError::new(3, "No articles collected; nothing to score."));
    }
    println!("{}", crate::report::format_daily_sentiment(&run.scored));

    if let Some(path) = &args.stats_json {
        let json = serde_json::to_string_pretty(&run.stats)
            .map_err(|e| AppError::new(2, format!("Failed to encode collection stats: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
    }

    write_series_csv(&args.output, FAITH_SCORE_COLUMN, &run.scored.rows())?;
    println!("Faith scores saved to '{}'", args.output.display());
    Ok(())
}

fn handle_market(args: MarketArgs) -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let api = settings.coingecko_client()?;
    let target = if args.total {
        MarketTarget::Total { top: args.top }
    } else {
        MarketTarget::Coin(args.coin.clone())
    };

    let today = Utc::now().date_naive();
    let series = pipeline::fetch_market(&api, &target, args.days, today)?;
    println!("{}", crate::report::format_market_summary(&series));

    let rows: Vec<_> = series.points.iter().map(|p| (p.date, p.value)).collect();
    write_series_csv(&args.output, &series.label, &rows)?;
    println!("Market data saved to '{}'", args.output.display());
    Ok(())
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let faith = read_series_csv(&args.faith)?;
    let market = read_series_csv(&args.market)?;
    for (table, path) in [(&faith, &args.faith), (&market, &args.market)] {
        for err in &table.row_errors {
            warn!(path = %path.display(), line = err.line, error = %err.message, "skipped row");
        }
    }
    if faith.rows.is_empty() || market.rows.is_empty() {
        return Err(AppError::new(3, "Faith score or market table has no usable rows."));
    }

    let run = pipeline::run_analysis(&faith.faith_scores(), &market.market_points());
    println!(
        "Aligned {} days (faith: {}, {}: {})\n",
        run.records.len(),
        faith.rows.len(),
        market.value_column,
        market.rows.len()
    );
    println!("{}", crate::report::format_correlations(&run.outcome));

    if let Some(summary) = &run.summary {
        println!("{}", crate::report::format_summary(summary));
    }

    if !args.no_plot {
        if let Some(plots) = run.render_plots(args.width, args.height) {
            println!("{plots}");
        }
    }

    if !args.no_export {
        write_aligned_csv(&args.export, &run.records)?;
        println!("Aligned data saved to '{}'", args.export.display());
    }
    if let Some(path) = &args.export_json {
        let export = AnalysisExport {
            tool: "faith",
            market_label: &market.value_column,
            records: &run.records,
            correlation: &run.outcome,
            summary: run.summary.as_ref(),
        };
        write_report_json(path, &export)?;
        println!("Analysis report saved to '{}'", path.display());
    }
    Ok(())
}

fn handle_vocabulary(args: VocabularyArgs) -> Result<(), AppError> {
    let vocabulary = load_vocabulary(args.file.as_deref())?;
    println!("{}", vocabulary.to_json_pretty()?);
    Ok(())
}

fn load_vocabulary(path: Option<&std::path::Path>) -> Result<Vocabulary, AppError> {
    match path {
        Some(path) => Vocabulary::from_json_file(path),
        None => Ok(Vocabulary::default()),
    }
}

pub fn collector_config_from_args(args: &CollectArgs) -> CollectorConfig {
    CollectorConfig {
        query: args.query.clone(),
        language: args.language.clone(),
        days: args.days,
        auxiliary_terms: args.aux_terms.clone(),
        empty_day_lookback: args.lookback,
        request_delay: Duration::from_millis(args.delay_ms),
    }
}
