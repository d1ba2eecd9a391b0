//! Seeded synthetic market data for offline runs
//!
//! Every series is derived from the ticker symbol alone, so two runs over the
//! same query see identical prices. Timestamps are anchored at a fixed date.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use forum_core::{
    IndexProvider, NewsArticle, NewsProvider, PricePoint, PriceSeriesProvider, Result, Ticker,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const NEWS_PER_TICKER: usize = 2;

const MARKET_HEADLINES: &[&str] = &[
    "Stocks edge higher as investors weigh rate outlook",
    "Treasury yields steady ahead of inflation data",
    "Energy shares lead sector rotation",
];

const TICKER_HEADLINES: &[&str] = &[
    "{} beats quarterly revenue estimates",
    "Analysts revisit price targets for {}",
    "{} announces expanded buyback program",
    "{} shares active in heavy trading",
];

const INDEX_LEVELS: &[(&str, f64)] = &[
    ("S&P 500", 5_200.0),
    ("Dow Jones", 39_000.0),
    ("Nasdaq", 16_300.0),
];

/// Offline provider for price series, news and indexes
#[derive(Debug, Clone)]
pub struct SampleMarketData {
    anchor: DateTime<Utc>,
}

impl Default for SampleMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleMarketData {
    pub fn new() -> Self {
        Self {
            anchor: Utc
                .with_ymd_and_hms(2024, 6, 28, 20, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }

    /// Use a different last timestamp for generated series
    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    fn rng_for(key: &str) -> StdRng {
        let seed = key
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            });
        StdRng::seed_from_u64(seed)
    }

    /// One daily close per day of the lookback, ending at the anchor
    pub fn series(&self, ticker: &Ticker, lookback_days: u32) -> Vec<PricePoint> {
        let mut rng = Self::rng_for(ticker.as_str());
        let mut price: f64 = rng.gen_range(40.0..400.0);
        let drift: f64 = rng.gen_range(-0.004..0.006);
        let days = i64::from(lookback_days.max(1));

        (0..days)
            .map(|i| {
                if i > 0 {
                    price *= 1.0 + drift + rng.gen_range(-0.02..0.02);
                }
                let timestamp = self.anchor - Duration::days(days - 1 - i);
                PricePoint::new(timestamp, (price * 100.0).round() / 100.0)
            })
            .collect()
    }

    fn articles(&self, keyword: &str) -> Vec<NewsArticle> {
        let keyword = keyword.trim();
        if keyword.is_empty() || keyword.eq_ignore_ascii_case("market") {
            return MARKET_HEADLINES
                .iter()
                .enumerate()
                .map(|(i, headline)| self.article(headline, i))
                .collect();
        }

        let mut rng = Self::rng_for(keyword);
        let offset = rng.gen_range(0..TICKER_HEADLINES.len());
        (0..NEWS_PER_TICKER)
            .map(|i| {
                let template = TICKER_HEADLINES[(offset + i) % TICKER_HEADLINES.len()];
                self.article(&template.replace("{}", keyword), i)
            })
            .collect()
    }

    fn article(&self, headline: &str, hours_ago: usize) -> NewsArticle {
        NewsArticle {
            headline: headline.to_string(),
            source: "Sample Wire".to_string(),
            timestamp: self.anchor - Duration::hours(hours_ago as i64 + 1),
        }
    }
}

#[async_trait]
impl PriceSeriesProvider for SampleMarketData {
    async fn get_price_series(&self, ticker: &Ticker, lookback_days: u32) -> Result<Vec<PricePoint>> {
        Ok(self.series(ticker, lookback_days))
    }
}

#[async_trait]
impl NewsProvider for SampleMarketData {
    async fn get_news(&self, keyword: &str) -> Result<Vec<NewsArticle>> {
        Ok(self.articles(keyword))
    }
}

#[async_trait]
impl IndexProvider for SampleMarketData {
    async fn get_indexes(&self) -> Result<BTreeMap<String, f64>> {
        Ok(INDEX_LEVELS
            .iter()
            .map(|(name, level)| (name.to_string(), *level))
            .collect())
    }
}
