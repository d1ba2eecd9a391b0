//! Caching layer for price series to reduce API calls

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use forum_core::{PricePoint, PriceSeriesProvider, Result, Ticker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for a price series request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub ticker: Ticker,
    pub lookback_days: u32,
}

impl SeriesKey {
    pub fn new(ticker: &Ticker, lookback_days: u32) -> Self {
        Self {
            ticker: ticker.clone(),
            lookback_days,
        }
    }
}

/// Thread-safe cache for price series
pub struct SeriesCache {
    cache: Arc<RwLock<TimedCache<SeriesKey, Vec<PricePoint>>>>,
}

impl SeriesCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &SeriesKey) -> Option<Vec<PricePoint>> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: SeriesKey, value: Vec<PricePoint>) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: SeriesKey, fetcher: F) -> Result<Vec<PricePoint>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<PricePoint>>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for key: {:?}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {:?}", key);

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    pub async fn invalidate(&self, key: &SeriesKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for SeriesCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Price series provider that serves repeated requests from a [`SeriesCache`]
pub struct CachedPriceProvider<P> {
    inner: P,
    cache: SeriesCache,
}

impl<P: PriceSeriesProvider> CachedPriceProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: SeriesCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }
}

#[async_trait]
impl<P: PriceSeriesProvider> PriceSeriesProvider for CachedPriceProvider<P> {
    async fn get_price_series(&self, ticker: &Ticker, lookback_days: u32) -> Result<Vec<PricePoint>> {
        self.cache
            .get_or_fetch(SeriesKey::new(ticker, lookback_days), || {
                self.inner.get_price_series(ticker, lookback_days)
            })
            .await
    }
}
