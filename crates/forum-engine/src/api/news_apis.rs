//! Finnhub news client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_core::{NewsArticle, NewsProvider};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::{ProviderError, Result};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_RATE_LIMIT: NonZeroU32 = NonZeroU32::new(60).unwrap();

/// Days of company news requested per ticker
const COMPANY_NEWS_DAYS: i64 = 7;

/// Finnhub news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubNewsArticle {
    #[serde(default)]
    pub category: String,
    /// Publish time (UNIX timestamp)
    pub datetime: i64,
    pub headline: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub related: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
}

impl FinnhubNewsArticle {
    fn mentions(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.headline.to_lowercase().contains(&keyword)
            || self.summary.to_lowercase().contains(&keyword)
            || self.related.to_lowercase().contains(&keyword)
    }
}

impl From<FinnhubNewsArticle> for NewsArticle {
    fn from(article: FinnhubNewsArticle) -> Self {
        Self {
            headline: article.headline,
            source: article.source,
            timestamp: DateTime::from_timestamp(article.datetime, 0).unwrap_or_default(),
        }
    }
}

/// Finnhub client for news API
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(DEFAULT_RATE_LIMIT));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Build a client from the configured key, failing when none is set
    pub fn from_config(config: &crate::ForumConfig) -> Result<Self> {
        let api_key =
            config
                .finnhub_api_key
                .clone()
                .ok_or_else(|| ProviderError::MissingApiKey {
                    provider: "finnhub".to_string(),
                })?;
        Ok(Self::new(api_key, config.finnhub_rate_limit))
    }

    /// Get company news for a specific symbol
    ///
    /// # Arguments
    /// * `symbol` - Stock symbol (e.g., "AAPL")
    /// * `from` - Start date (YYYY-MM-DD)
    /// * `to` - End date (YYYY-MM-DD)
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        let url = format!(
            "https://finnhub.io/api/v1/company-news?symbol={}&from={}&to={}&token={}",
            symbol, from, to, self.api_key
        );
        self.fetch(&url).await
    }

    /// Get general market news
    ///
    /// # Arguments
    /// * `category` - News category (general, forex, crypto, merger)
    pub async fn get_market_news(&self, category: &str) -> Result<Vec<FinnhubNewsArticle>> {
        let url = format!(
            "https://finnhub.io/api/v1/news?category={}&token={}",
            category, self.api_key
        );
        self.fetch(&url).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<FinnhubNewsArticle>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Finnhub request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "Finnhub API error {status}: {body}"
            )));
        }

        response
            .json::<Vec<FinnhubNewsArticle>>()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse Finnhub response: {e}")))
    }
}

/// Keywords that look like a ticker are looked up as company news
fn is_ticker_shaped(keyword: &str) -> bool {
    let symbol = keyword.split('.').next().unwrap_or_default();
    (1..=5).contains(&symbol.len()) && symbol.chars().all(|c| c.is_ascii_uppercase())
}

#[async_trait]
impl NewsProvider for FinnhubClient {
    async fn get_news(&self, keyword: &str) -> forum_core::Result<Vec<NewsArticle>> {
        let keyword = keyword.trim();
        let articles = if is_ticker_shaped(keyword) {
            let to = Utc::now().date_naive();
            let from = to - chrono::Duration::days(COMPANY_NEWS_DAYS);
            self.get_company_news(keyword, &from.to_string(), &to.to_string())
                .await?
        } else {
            let articles = self.get_market_news("general").await?;
            if keyword.is_empty() || keyword.eq_ignore_ascii_case("market") {
                articles
            } else {
                articles.into_iter().filter(|a| a.mentions(keyword)).collect()
            }
        };

        Ok(articles.into_iter().map(NewsArticle::from).collect())
    }
}
