//! Market-value series strategies.
//!
//! Each strategy produces a `MarketSeries` or a typed `SourceError`. A
//! `MarketChain` tries its strategies in order and returns the first success,
//! keeping the reasons earlier strategies failed.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use crate::data::coingecko::MarketApi;
use crate::domain::{MarketDataPoint, MarketSeries};
use crate::error::SourceError;

/// Bitcoin dominance has historically sat around 40-60%.
pub const BITCOIN_PROXY_MULTIPLIER: f64 = 2.5;
pub const TOTAL_MARKET_LABEL: &str = "Total Market Cap USD";

pub trait MarketStrategy {
    fn name(&self) -> &'static str;
    fn fetch(&self, days: u32) -> Result<MarketSeries, SourceError>;
}

/// A single coin's own market cap history.
pub struct CoinHistory<'a> {
    api: &'a dyn MarketApi,
    coin_id: String,
}

impl<'a> CoinHistory<'a> {
    pub fn new(api: &'a dyn MarketApi, coin_id: impl Into<String>) -> Self {
        Self {
            api,
            coin_id: coin_id.into(),
        }
    }
}

impl MarketStrategy for CoinHistory<'_> {
    fn name(&self) -> &'static str {
        "coin-history"
    }

    fn fetch(&self, days: u32) -> Result<MarketSeries, SourceError> {
        let points = self.api.market_caps(&self.coin_id, days)?;
        Ok(MarketSeries::new(coin_label(&self.coin_id), points))
    }
}

/// Total market cap as the per-date sum of the largest coins.
pub struct TopCoinsTotal<'a> {
    api: &'a dyn MarketApi,
    limit: usize,
}

impl<'a> TopCoinsTotal<'a> {
    pub fn new(api: &'a dyn MarketApi, limit: usize) -> Self {
        Self { api, limit }
    }
}

impl MarketStrategy for TopCoinsTotal<'_> {
    fn name(&self) -> &'static str {
        "top-coins-total"
    }

    fn fetch(&self, days: u32) -> Result<MarketSeries, SourceError> {
        let ids = self.api.top_coin_ids(self.limit)?;

        let mut histories = Vec::new();
        for id in ids.iter().take(self.limit) {
            match self.api.market_caps(id, days) {
                Ok(points) => histories.push(points),
                Err(err) => warn!(coin = %id, error = %err, "skipping coin without history"),
            }
        }
        let Some((first, rest)) = histories.split_first() else {
            return Err(SourceError::Empty);
        };

        // Dates follow the largest coin; the others contribute where they have data.
        let by_date: Vec<BTreeMap<NaiveDate, f64>> = rest
            .iter()
            .map(|h| h.iter().map(|p| (p.date, p.value)).collect())
            .collect();
        let points = first
            .iter()
            .map(|p| MarketDataPoint {
                date: p.date,
                value: p.value + by_date.iter().filter_map(|m| m.get(&p.date)).sum::<f64>(),
            })
            .collect();

        info!(coins = histories.len(), "summed top coin market caps");
        Ok(MarketSeries::new(TOTAL_MARKET_LABEL, points))
    }
}

/// Bitcoin market cap scaled up as a rough stand-in for the total.
pub struct BitcoinProxy<'a> {
    api: &'a dyn MarketApi,
}

impl<'a> BitcoinProxy<'a> {
    pub fn new(api: &'a dyn MarketApi) -> Self {
        Self { api }
    }
}

impl MarketStrategy for BitcoinProxy<'_> {
    fn name(&self) -> &'static str {
        "bitcoin-proxy"
    }

    fn fetch(&self, days: u32) -> Result<MarketSeries, SourceError> {
        let points = self
            .api
            .market_caps("bitcoin", days)?
            .into_iter()
            .map(|p| MarketDataPoint {
                date: p.date,
                value: p.value * BITCOIN_PROXY_MULTIPLIER,
            })
            .collect();
        Ok(MarketSeries::new(TOTAL_MARKET_LABEL, points))
    }
}

/// Current global total projected backwards along the 24h trend.
///
/// Only an estimate: the history is synthesized, not observed.
pub struct GlobalTrendEstimate<'a> {
    api: &'a dyn MarketApi,
    today: NaiveDate,
}

impl<'a> GlobalTrendEstimate<'a> {
    pub fn new(api: &'a dyn MarketApi, today: NaiveDate) -> Self {
        Self { api, today }
    }
}

impl MarketStrategy for GlobalTrendEstimate<'_> {
    fn name(&self) -> &'static str {
        "global-trend-estimate"
    }

    fn fetch(&self, days: u32) -> Result<MarketSeries, SourceError> {
        let snapshot = self.api.global_snapshot()?;
        let points = project_trend(
            snapshot.total_market_cap_usd,
            snapshot.market_cap_change_24h_pct,
            days,
            self.today,
        );
        if points.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(MarketSeries::new(TOTAL_MARKET_LABEL, points))
    }
}

/// Synthesize `days` daily values ending at `today`, oldest first.
pub fn project_trend(current: f64, change_24h_pct: f64, days: u32, today: NaiveDate) -> Vec<MarketDataPoint> {
    let mut out = Vec::with_capacity(days as usize);
    for i in 0..days {
        let days_ago = days - i - 1;
        let Some(date) = today.checked_sub_days(Days::new(u64::from(days_ago))) else {
            continue;
        };
        let trend = 1.0 + (change_24h_pct / 100.0) * (f64::from(days_ago) / 30.0);
        let ripple = 1.0 + 0.02 * (f64::from(i % 7) - 3.0) / 7.0;
        out.push(MarketDataPoint {
            date,
            value: current * trend * ripple,
        });
    }
    out
}

/// Result of a chain run.
#[derive(Debug, Clone)]
pub struct ChainSuccess {
    pub series: MarketSeries,
    pub strategy: &'static str,
    pub failures: Vec<(&'static str, SourceError)>,
}

/// Every strategy failed.
#[derive(Debug, Clone)]
pub struct ChainExhausted {
    pub failures: Vec<(&'static str, SourceError)>,
}

impl std::fmt::Display for ChainExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "all market data strategies failed")?;
        for (name, err) in &self.failures {
            write!(f, "; {name}: {err}")?;
        }
        Ok(())
    }
}

/// Ordered fallback list of market strategies.
#[derive(Default)]
pub struct MarketChain<'a> {
    strategies: Vec<Box<dyn MarketStrategy + 'a>>,
}

impl<'a> MarketChain<'a> {
    pub fn new() -> Self {
        Self { strategies: Vec::new() }
    }

    pub fn then(mut self, strategy: impl MarketStrategy + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Preferred total-market chain: top coins, then bitcoin proxy, then estimate.
    pub fn total_market(api: &'a dyn MarketApi, top_n: usize, today: NaiveDate) -> Self {
        Self::new()
            .then(TopCoinsTotal::new(api, top_n))
            .then(BitcoinProxy::new(api))
            .then(GlobalTrendEstimate::new(api, today))
    }

    pub fn fetch(&self, days: u32) -> Result<ChainSuccess, ChainExhausted> {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            match strategy.fetch(days) {
                Ok(series) if !series.points.is_empty() => {
                    info!(strategy = strategy.name(), points = series.points.len(), "market series ready");
                    return Ok(ChainSuccess {
                        series,
                        strategy: strategy.name(),
                        failures,
                    });
                }
                Ok(_) => {
                    warn!(strategy = strategy.name(), "strategy returned an empty series; falling back");
                    failures.push((strategy.name(), SourceError::Empty));
                }
                Err(err) => {
                    warn!(strategy = strategy.name(), error = %err, "strategy failed; falling back");
                    failures.push((strategy.name(), err));
                }
            }
        }
        Err(ChainExhausted { failures })
    }
}

/// Column label for a coin's market cap, e.g. `bitcoin` -> "Bitcoin Market Cap USD".
pub fn coin_label(coin_id: &str) -> String {
    let name: String = coin_id
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{name} Market Cap USD")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::data::coingecko::GlobalSnapshot;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(values: &[(u32, f64)]) -> Vec<MarketDataPoint> {
        values
            .iter()
            .map(|&(d, value)| MarketDataPoint { date: date(2024, 1, d), value })
            .collect()
    }

    #[derive(Default)]
    struct FakeApi {
        top: Option<Vec<String>>,
        histories: HashMap<String, Vec<MarketDataPoint>>,
        global: Option<GlobalSnapshot>,
    }

    impl MarketApi for FakeApi {
        fn top_coin_ids(&self, limit: usize) -> Result<Vec<String>, SourceError> {
            self.top
                .clone()
                .map(|ids| ids.into_iter().take(limit).collect())
                .ok_or(SourceError::Status(429))
        }

        fn market_caps(&self, coin_id: &str, _days: u32) -> Result<Vec<MarketDataPoint>, SourceError> {
            self.histories.get(coin_id).cloned().ok_or(SourceError::Empty)
        }

        fn global_snapshot(&self) -> Result<GlobalSnapshot, SourceError> {
            self.global.ok_or_else(|| SourceError::Request("offline".into()))
        }
    }

    #[test]
    fn top_coins_sum_by_date_and_skip_missing_coins() {
        let mut api = FakeApi {
            top: Some(vec!["bitcoin".into(), "ethereum".into(), "ghost".into()]),
            ..Default::default()
        };
        api.histories.insert("bitcoin".into(), series(&[(1, 100.0), (2, 110.0)]));
        api.histories.insert("ethereum".into(), series(&[(2, 50.0)]));

        let out = TopCoinsTotal::new(&api, 20).fetch(30).unwrap();
        assert_eq!(out.label, TOTAL_MARKET_LABEL);
        assert_eq!(out.points, series(&[(1, 100.0), (2, 160.0)]));
    }

    #[test]
    fn chain_falls_back_in_order_and_records_failures() {
        let mut api = FakeApi::default();
        api.histories.insert("bitcoin".into(), series(&[(1, 100.0)]));

        let chain = MarketChain::total_market(&api, 20, date(2024, 1, 1));
        let ok = chain.fetch(30).unwrap();

        assert_eq!(ok.strategy, "bitcoin-proxy");
        assert_eq!(ok.series.points[0].value, 250.0);
        assert_eq!(ok.failures, vec![("top-coins-total", SourceError::Status(429))]);
    }

    #[test]
    fn chain_uses_estimate_as_last_resort() {
        let api = FakeApi {
            global: Some(GlobalSnapshot {
                total_market_cap_usd: 1000.0,
                market_cap_change_24h_pct: 0.0,
            }),
            ..Default::default()
        };
        let ok = MarketChain::total_market(&api, 20, date(2024, 1, 10)).fetch(3).unwrap();
        assert_eq!(ok.strategy, "global-trend-estimate");
        assert_eq!(ok.failures.len(), 2);
        assert_eq!(ok.series.points.len(), 3);
    }

    #[test]
    fn chain_reports_every_failure_when_exhausted() {
        let api = FakeApi::default();
        let err = MarketChain::total_market(&api, 20, date(2024, 1, 1)).fetch(30).unwrap_err();
        let names: Vec<_> = err.failures.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["top-coins-total", "bitcoin-proxy", "global-trend-estimate"]);
        assert!(err.to_string().starts_with("all market data strategies failed"));
    }

    #[test]
    fn projected_trend_ends_today_with_ripple() {
        let today = date(2024, 1, 30);
        let points = project_trend(1000.0, 3.0, 30, today);

        assert_eq!(points.len(), 30);
        assert_eq!(points[0].date, date(2024, 1, 1));
        assert_eq!(points[29].date, today);
        // i = 29: days_ago 0, ripple (29 % 7 = 1) -> 1 + 0.02 * -2/7
        let expected_last = 1000.0 * (1.0 + 0.02 * -2.0 / 7.0);
        assert!((points[29].value - expected_last).abs() < 1e-9);
        // i = 0: days_ago 29, trend 1 + 0.03 * 29/30, ripple 1 + 0.02 * -3/7
        let expected_first = 1000.0 * (1.0 + 0.03 * 29.0 / 30.0) * (1.0 + 0.02 * -3.0 / 7.0);
        assert!((points[0].value - expected_first).abs() < 1e-9);
    }

    #[test]
    fn coin_labels_are_title_cased() {
        assert_eq!(coin_label("bitcoin"), "Bitcoin Market Cap USD");
        assert_eq!(coin_label("wrapped-bitcoin"), "Wrapped Bitcoin Market Cap USD");
    }
}
