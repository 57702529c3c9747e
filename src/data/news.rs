//! News source integration (NewsAPI `everything` endpoint).

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::Article;
use crate::error::{RecordError, SourceError};

pub const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
const DEFAULT_PAGE_SIZE: u32 = 50;

/// One per-day, per-term query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub term: String,
    pub language: String,
    pub day: NaiveDate,
}

/// Article record as delivered by the source; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RawArticle {
    /// Validate into an `Article`.
    ///
    /// A missing url is kept as an empty string so deduplication can drop it.
    pub fn into_article(self) -> Result<Article, RecordError> {
        let raw_ts = self.published_at.ok_or(RecordError::MissingField("publishedAt"))?;
        let published_at = parse_published_at(&raw_ts)?;
        let title = self.title.ok_or(RecordError::MissingField("title"))?;
        Ok(Article {
            url: self.url.unwrap_or_default(),
            published_at,
            title,
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Parse an ISO-8601 publish timestamp into UTC.
///
/// Accepts a `Z` suffix, a numeric offset, or no offset at all (read as UTC).
pub fn parse_published_at(raw: &str) -> Result<DateTime<Utc>, RecordError> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(RecordError::BadTimestamp(raw.to_string()))
}

/// Anything that can answer a per-day news query.
pub trait NewsSource {
    fn fetch_day(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, SourceError>;
}

#[derive(Debug)]
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    page_size: u32,
    max_pages: u32,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: 1,
        })
    }

    pub fn with_paging(mut self, page_size: u32, max_pages: u32) -> Self {
        self.page_size = page_size.clamp(1, 100);
        self.max_pages = max_pages.max(1);
        self
    }

    fn fetch_page(&self, query: &NewsQuery, page: u32) -> Result<EverythingResponse, SourceError> {
        let day = query.day.format("%Y-%m-%d").to_string();
        let page_size = self.page_size.to_string();
        let page = page.to_string();
        let resp = self
            .client
            .get(format!("{}/everything", self.base_url.trim_end_matches('/')))
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.term.as_str()),
                ("language", query.language.as_str()),
                ("sortBy", "publishedAt"),
                ("from", day.as_str()),
                ("to", day.as_str()),
                ("pageSize", page_size.as_str()),
                ("page", page.as_str()),
            ])
            .send()?;

        let status = resp.status();
        let body: EverythingResponse = match resp.json() {
            Ok(body) => body,
            Err(_) if !status.is_success() => return Err(SourceError::Status(status.as_u16())),
            Err(e) => return Err(SourceError::Payload(format!("NewsAPI response: {e}"))),
        };

        if body.status == "error" {
            return Err(SourceError::Api {
                code: body.code.unwrap_or_else(|| "unknown".to_string()),
                message: body.message.unwrap_or_default(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        Ok(body)
    }
}

impl NewsSource for NewsApiClient {
    fn fetch_day(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, SourceError> {
        let mut out = Vec::new();
        for page in 1..=self.max_pages {
            let body = self.fetch_page(query, page)?;
            let received = body.articles.len();
            out.extend(body.articles);

            let exhausted = received < self.page_size as usize
                || body.total_results.map_or(true, |total| out.len() as u64 >= total);
            if exhausted {
                break;
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}
