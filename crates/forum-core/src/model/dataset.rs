//! Market data resolved for one request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::query::Ticker;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Finite, strictly positive prices are usable for derivation
    pub fn is_usable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Identifier assigned by the data stage, e.g. `AAPL:news:0`
    pub id: String,
    pub headline: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Data gathered for one resolved entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerData {
    pub ticker: Ticker,
    pub points: Vec<PricePoint>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

impl TickerData {
    pub fn usable_points(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter().filter(|p| p.is_usable())
    }

    pub fn usable_prices(&self) -> Vec<f64> {
        self.usable_points().map(|p| p.price).collect()
    }
}

/// Which provider a gap refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    PriceSeries,
    News,
    Indexes,
}

/// A sub-result that the data stage could not obtain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGap {
    pub ticker: Option<Ticker>,
    pub source: DataSource,
    pub reason: String,
}

impl DataGap {
    pub fn describe(&self) -> String {
        let source = match self.source {
            DataSource::PriceSeries => "price series",
            DataSource::News => "news",
            DataSource::Indexes => "indexes",
        };
        match &self.ticker {
            Some(ticker) => format!("{ticker} {source}: {}", self.reason),
            None => format!("{source}: {}", self.reason),
        }
    }
}

/// Everything the data stage produced for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDataset {
    pub entries: Vec<TickerData>,
    /// News fetched without a specific entity
    #[serde(default)]
    pub market_news: Vec<NewsItem>,
    #[serde(default)]
    pub indexes: BTreeMap<String, f64>,
    #[serde(default)]
    pub gaps: Vec<DataGap>,
}

impl MarketDataset {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.market_news.is_empty() && self.indexes.is_empty()
    }

    pub fn entry(&self, ticker: &Ticker) -> Option<&TickerData> {
        self.entries.iter().find(|e| &e.ticker == ticker)
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        self.entries.iter().map(|e| e.ticker.clone()).collect()
    }

    pub fn total_points(&self) -> usize {
        self.entries.iter().map(|e| e.points.len()).sum()
    }

    pub fn usable_points(&self) -> usize {
        self.entries.iter().map(|e| e.usable_points().count()).sum()
    }

    pub fn news_items(&self) -> impl Iterator<Item = &NewsItem> {
        self.entries
            .iter()
            .flat_map(|e| e.news.iter())
            .chain(self.market_news.iter())
    }

    pub fn news_item(&self, id: &str) -> Option<&NewsItem> {
        self.news_items().find(|n| n.id == id)
    }
}
