//! CoinGecko API integration (market caps).

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;

use crate::domain::MarketDataPoint;
use crate::error::SourceError;

pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const VS_CURRENCY: &str = "usd";

/// Current whole-market totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSnapshot {
    pub total_market_cap_usd: f64,
    pub market_cap_change_24h_pct: f64,
}

/// The market-data calls the series strategies rely on.
pub trait MarketApi {
    /// Coin ids ordered by market cap, largest first.
    fn top_coin_ids(&self, limit: usize) -> Result<Vec<String>, SourceError>;

    /// Daily market caps for one coin over the last `days` days, oldest first.
    fn market_caps(&self, coin_id: &str, days: u32) -> Result<Vec<MarketDataPoint>, SourceError>;

    fn global_snapshot(&self) -> Result<GlobalSnapshot, SourceError>;
}

#[derive(Debug)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let req = self
            .client
            .get(format!("{}/{}", self.base_url.trim_end_matches('/'), path));
        match &self.api_key {
            Some(key) => req.header("x-cg-demo-api-key", key),
            None => req,
        }
    }

    fn send<T: for<'de> Deserialize<'de>>(req: RequestBuilder) -> Result<T, SourceError> {
        let resp = req.send()?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        resp.json::<T>()
            .map_err(|e| SourceError::Payload(format!("CoinGecko response: {e}")))
    }
}

impl MarketApi for CoinGeckoClient {
    fn top_coin_ids(&self, limit: usize) -> Result<Vec<String>, SourceError> {
        let per_page = limit.clamp(1, 250).to_string();
        let req = self.get("coins/markets").query(&[
            ("vs_currency", VS_CURRENCY),
            ("order", "market_cap_desc"),
            ("per_page", per_page.as_str()),
            ("page", "1"),
        ]);
        let coins: Vec<MarketCoin> = Self::send(req)?;
        if coins.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(coins.into_iter().map(|c| c.id).take(limit).collect())
    }

    fn market_caps(&self, coin_id: &str, days: u32) -> Result<Vec<MarketDataPoint>, SourceError> {
        let days = days.to_string();
        let req = self.get(&format!("coins/{coin_id}/market_chart")).query(&[
            ("vs_currency", VS_CURRENCY),
            ("days", days.as_str()),
            ("interval", "daily"),
        ]);
        let chart: MarketChart = Self::send(req)?;
        let points = daily_points(&chart.market_caps)?;
        if points.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(points)
    }

    fn global_snapshot(&self) -> Result<GlobalSnapshot, SourceError> {
        let body: GlobalResponse = Self::send(self.get("global"))?;
        let total = body
            .data
            .total_market_cap
            .get(VS_CURRENCY)
            .copied()
            .ok_or_else(|| SourceError::Payload("global response lacks usd market cap".to_string()))?;
        Ok(GlobalSnapshot {
            total_market_cap_usd: total,
            market_cap_change_24h_pct: body.data.market_cap_change_percentage_24h_usd,
        })
    }
}

/// Convert `[timestamp_ms, value]` pairs to one point per UTC date (first sample wins).
pub fn daily_points(pairs: &[(f64, f64)]) -> Result<Vec<MarketDataPoint>, SourceError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(pairs.len());
    for &(ts_ms, value) in pairs {
        let date = DateTime::<Utc>::from_timestamp_millis(ts_ms as i64)
            .ok_or_else(|| SourceError::Payload(format!("timestamp out of range: {ts_ms}")))?
            .date_naive();
        if !(value.is_finite() && value >= 0.0) {
            continue;
        }
        if seen.insert(date) {
            out.push(MarketDataPoint { date, value });
        }
    }
    out.sort_by_key(|p| p.date);
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct MarketCoin {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    market_caps: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    total_market_cap: std::collections::HashMap<String, f64>,
    market_cap_change_percentage_24h_usd: f64,
}
