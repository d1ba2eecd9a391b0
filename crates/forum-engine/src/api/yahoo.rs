//! Yahoo Finance API client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_core::{IndexProvider, PricePoint, PriceSeriesProvider, Ticker};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use crate::error::{ProviderError, Result};

/// Market indexes reported by [`IndexProvider::get_indexes`]
pub const MARKET_INDEXES: &[(&str, &str)] = &[
    ("S&P 500", "^GSPC"),
    ("Dow Jones", "^DJI"),
    ("Nasdaq", "^IXIC"),
];

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| ProviderError::YahooFinanceError(e.to_string()))
    }

    /// Get the latest close for a symbol
    pub async fn get_latest_close(&self, symbol: &str) -> Result<f64> {
        let response = Self::connector()?
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| ProviderError::YahooFinanceError(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| ProviderError::YahooFinanceError(e.to_string()))?;

        Ok(quote.close)
    }

    /// Get daily closes between two instants
    pub async fn get_historical_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>> {
        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            ProviderError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| ProviderError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = Self::connector()?
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| ProviderError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| ProviderError::YahooFinanceError(e.to_string()))?;

        let mut points: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0)
                    .map(|timestamp| PricePoint::new(timestamp, q.close))
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);

        if points.is_empty() {
            return Err(ProviderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "No historical data available".to_string(),
            });
        }

        Ok(points)
    }
}

#[async_trait]
impl PriceSeriesProvider for YahooFinanceClient {
    async fn get_price_series(
        &self,
        ticker: &Ticker,
        lookback_days: u32,
    ) -> forum_core::Result<Vec<PricePoint>> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(lookback_days));
        Ok(self.get_historical_closes(ticker.as_str(), start, end).await?)
    }
}

#[async_trait]
impl IndexProvider for YahooFinanceClient {
    async fn get_indexes(&self) -> forum_core::Result<BTreeMap<String, f64>> {
        let lookups = MARKET_INDEXES.iter().map(|(name, symbol)| async move {
            (*name, self.get_latest_close(symbol).await)
        });

        let mut indexes = BTreeMap::new();
        let mut last_error = None;
        for (name, result) in futures::future::join_all(lookups).await {
            match result {
                Ok(value) => {
                    indexes.insert(name.to_string(), value);
                }
                Err(e) => {
                    tracing::debug!(index = name, error = %e, "Index lookup failed");
                    last_error = Some(e);
                }
            }
        }

        match (indexes.is_empty(), last_error) {
            (true, Some(e)) => Err(e.into()),
            _ => Ok(indexes),
        }
    }
}
