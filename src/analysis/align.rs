//! Same-date join of the faith score series with a market series.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{AlignedRecord, FaithScore, MarketDataPoint};

/// Inner join on exact calendar date.
///
/// Output order follows `faith`. Dates present on only one side are dropped;
/// repeated dates keep their first occurrence. `market_value_pct_change` is the
/// change against the previous aligned row, `None` on the first row and after a
/// zero value.
pub fn align_series(faith: &[FaithScore], market: &[MarketDataPoint]) -> Vec<AlignedRecord> {
    let mut market_by_date: HashMap<NaiveDate, f64> = HashMap::with_capacity(market.len());
    for point in market {
        market_by_date.entry(point.date).or_insert(point.value);
    }

    let mut seen = HashSet::new();
    let mut out: Vec<AlignedRecord> = Vec::new();
    for score in faith {
        if !seen.insert(score.date) {
            continue;
        }
        let Some(&market_value) = market_by_date.get(&score.date) else {
            continue;
        };
        let market_value_pct_change = out.last().and_then(|prev| pct_change(prev.market_value, market_value));
        out.push(AlignedRecord {
            date: score.date,
            faith_score: score.score,
            market_value,
            market_value_pct_change,
        });
    }

    info!(
        faith_days = faith.len(),
        market_days = market.len(),
        aligned = out.len(),
        "aligned series on same-day dates"
    );
    out
}

fn pct_change(prev: f64, curr: f64) -> Option<f64> {
    let change = (curr - prev) / prev * 100.0;
    change.is_finite().then_some(change)
}
