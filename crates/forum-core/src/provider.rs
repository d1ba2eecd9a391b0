//! Outbound collaborators the pipeline calls
//!
//! These are opaque capability providers; the pipeline only relies on the
//! signatures below. Implementations live in `forum-engine` or in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;
use crate::model::{PricePoint, Report, Ticker, UserProfile};

/// News item as returned by a provider, before identifiers are assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered price history for one ticker
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Points ordered by ascending timestamp covering `lookback_days`
    async fn get_price_series(&self, ticker: &Ticker, lookback_days: u32)
    -> Result<Vec<PricePoint>>;
}

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn get_news(&self, keyword: &str) -> Result<Vec<NewsArticle>>;
}

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Latest value per market index name
    async fn get_indexes(&self) -> Result<BTreeMap<String, f64>>;
}

/// Persistence for user profiles, last write wins
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<UserProfile>>;

    async fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()>;
}

/// Write-once persistence for reports
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a new report and return its stable identifier
    async fn save(&self, report: &Report) -> Result<String>;

    async fn load(&self, report_id: &str) -> Result<Option<Report>>;
}
