//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - collected articles and keyword hit counts (`Article`, `KeywordCounts`)
//! - the per-day sentiment accumulator and its score (`DailySentiment`, `FaithScore`)
//! - market series and aligned rows (`MarketDataPoint`, `AlignedRecord`)
//! - correlation outputs (`CorrelationResult`, `CorrelationOutcome`, etc.)

pub mod types;

pub use types::*;
