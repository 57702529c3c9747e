//! Environment configuration (`.env` + process environment).
//!
//! | variable                  | default                               |
//! |---------------------------|---------------------------------------|
//! | `NEWSAPI_KEY`             | required by `faith collect` only      |
//! | `NEWSAPI_BASE_URL`        | `https://newsapi.org/v2`              |
//! | `COINGECKO_BASE_URL`      | `https://api.coingecko.com/api/v3`    |
//! | `COINGECKO_API_KEY`       | unset (no demo key header)            |
//! | `FAITH_HTTP_TIMEOUT_SECS` | 30                                    |

use std::time::Duration;

use crate::data::coingecko::DEFAULT_COINGECKO_BASE_URL;
use crate::data::news::DEFAULT_NEWSAPI_BASE_URL;
use crate::data::{CoinGeckoClient, NewsApiClient};
use crate::error::AppError;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub newsapi_key: Option<String>,
    pub newsapi_base_url: String,
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub http_timeout: Duration,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout = match get("FAITH_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| AppError::new(2, format!("Invalid FAITH_HTTP_TIMEOUT_SECS '{raw}' (expected seconds).")))?;
                if secs == 0 {
                    return Err(AppError::new(2, "FAITH_HTTP_TIMEOUT_SECS must be at least 1."));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            newsapi_key: get("NEWSAPI_KEY"),
            newsapi_base_url: get("NEWSAPI_BASE_URL").unwrap_or_else(|| DEFAULT_NEWSAPI_BASE_URL.to_string()),
            coingecko_base_url: get("COINGECKO_BASE_URL").unwrap_or_else(|| DEFAULT_COINGECKO_BASE_URL.to_string()),
            coingecko_api_key: get("COINGECKO_API_KEY"),
            http_timeout,
        })
    }

    pub fn news_client(&self) -> Result<NewsApiClient, AppError> {
        let key = self
            .newsapi_key
            .as_deref()
            .ok_or_else(|| AppError::new(2, "Missing NEWSAPI_KEY in environment (.env)."))?;
        Ok(NewsApiClient::new(key, self.newsapi_base_url.clone(), self.http_timeout)?)
    }

    pub fn coingecko_client(&self) -> Result<CoinGeckoClient, AppError> {
        Ok(CoinGeckoClient::new(
            self.coingecko_base_url.clone(),
            self.coingecko_api_key.clone(),
            self.http_timeout,
        )?)
    }
}
