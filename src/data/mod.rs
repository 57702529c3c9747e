//! External data sources and the article collector built on them.
//!
//! - NewsAPI client + per-day query trait (`news`)
//! - CoinGecko client (`coingecko`)
//! - market series strategies and their fallback chain (`market`)
//! - day-window article collection + dedup (`collector`)

pub mod coingecko;
pub mod collector;
pub mod market;
pub mod news;

pub use coingecko::{CoinGeckoClient, GlobalSnapshot, MarketApi};
pub use collector::{ArticleCollector, Collection, CollectionStats, CollectorConfig};
pub use market::{ChainExhausted, ChainSuccess, MarketChain, MarketStrategy};
pub use news::{NewsApiClient, NewsQuery, NewsSource, RawArticle};
