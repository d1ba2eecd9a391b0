//! Query agent: interprets raw text and resolves it into market data

use async_trait::async_trait;
use forum_core::{
    DataGap, DataSource, DataStage, Error, IndexProvider, MarketDataset, NewsArticle, NewsItem,
    NewsProvider, PricePoint, PriceSeriesProvider, Query, QueryInterpreter, Result, StageContext, Ticker,
    TickerData, UserProfile,
};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;

use crate::api::{FinnhubClient, SampleMarketData, YahooFinanceClient};
use crate::cache::CachedPriceProvider;
use crate::config::ForumConfig;
use crate::interpreter::KeywordInterpreter;

/// Keyword used for news when the query names no entity
const MARKET_NEWS_KEYWORD: &str = "market";

/// Interprets queries and fetches their market data through injected providers
pub struct QueryAgent {
    interpreter: KeywordInterpreter,
    prices: Arc<dyn PriceSeriesProvider>,
    news: Arc<dyn NewsProvider>,
    indexes: Arc<dyn IndexProvider>,
    config: Arc<ForumConfig>,
}

/// What one entity produced before it is folded into the dataset
struct EntityFetch {
    ticker: Ticker,
    points: Result<Vec<PricePoint>>,
    news: Result<Vec<NewsArticle>>,
}

impl QueryAgent {
    pub fn new(
        prices: Arc<dyn PriceSeriesProvider>,
        news: Arc<dyn NewsProvider>,
        indexes: Arc<dyn IndexProvider>,
        config: Arc<ForumConfig>,
    ) -> Self {
        Self {
            interpreter: KeywordInterpreter::from_config(&config),
            prices,
            news,
            indexes,
            config,
        }
    }

    /// Agent backed by seeded sample data, no network access
    pub fn offline(config: Arc<ForumConfig>) -> Self {
        let sample = Arc::new(SampleMarketData::new());
        Self::new(sample.clone(), sample.clone(), sample, config)
    }

    /// Agent backed by Yahoo Finance and, when a key is configured, Finnhub news
    pub fn live(config: Arc<ForumConfig>) -> Self {
        let yahoo = YahooFinanceClient::new();
        let prices = Arc::new(CachedPriceProvider::new(yahoo.clone(), config.price_cache_ttl));
        let news: Arc<dyn NewsProvider> = match FinnhubClient::from_config(&config) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::warn!("{e}; using sample news");
                Arc::new(SampleMarketData::new())
            }
        };
        Self::new(prices, news, Arc::new(yahoo), config)
    }

    pub fn prices(&self) -> &Arc<dyn PriceSeriesProvider> {
        &self.prices
    }

    pub fn news(&self) -> &Arc<dyn NewsProvider> {
        &self.news
    }

    pub fn indexes(&self) -> &Arc<dyn IndexProvider> {
        &self.indexes
    }

    /// Run one provider call under the per-call allowance of `ctx`
    async fn bounded<T>(
        &self,
        operation: String,
        ctx: &StageContext,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let budget = ctx.call_budget(self.config.provider_call_timeout);
        match tokio::time::timeout(budget, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::ProviderTimeout {
                operation,
                timeout_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    async fn fetch_entity(&self, ticker: &Ticker, lookback_days: u32, ctx: &StageContext) -> EntityFetch {
        let (points, news) = tokio::join!(
            self.bounded(
                format!("get_price_series({ticker})"),
                ctx,
                self.prices.get_price_series(ticker, lookback_days),
            ),
            self.bounded(
                format!("get_news({ticker})"),
                ctx,
                self.news.get_news(ticker.as_str()),
            ),
        );
        EntityFetch {
            ticker: ticker.clone(),
            points,
            news,
        }
    }

    fn assign_news_ids(prefix: &str, articles: Vec<NewsArticle>) -> Vec<NewsItem> {
        articles
            .into_iter()
            .enumerate()
            .map(|(i, article)| NewsItem {
                id: format!("{prefix}:news:{i}"),
                headline: article.headline,
                source: article.source,
                timestamp: article.timestamp,
            })
            .collect()
    }

    fn gap(ticker: Option<&Ticker>, source: DataSource, error: &Error) -> DataGap {
        DataGap {
            ticker: ticker.cloned(),
            source,
            reason: error.to_string(),
        }
    }
}

impl QueryInterpreter for QueryAgent {
    fn interpret(&self, raw_text: &str, profile: Option<&UserProfile>) -> Result<Query> {
        self.interpreter.interpret(raw_text, profile)
    }

    fn name(&self) -> &str {
        "query-agent"
    }
}

#[async_trait]
impl DataStage for QueryAgent {
    async fn fetch(&self, query: &Query, ctx: &StageContext) -> Result<MarketDataset> {
        let lookback_days = query.time_range().lookback_days;
        let entities = query.resolved_entities();

        tracing::debug!(
            entities = entities.len(),
            lookback_days,
            "Fetching market data"
        );

        let entity_fetches = join_all(
            entities
                .iter()
                .map(|ticker| self.fetch_entity(ticker, lookback_days, ctx)),
        );
        let indexes = self.bounded("get_indexes".to_string(), ctx, self.indexes.get_indexes());
        let market_news = async {
            if entities.is_empty() {
                Some(
                    self.bounded(
                        format!("get_news({MARKET_NEWS_KEYWORD})"),
                        ctx,
                        self.news.get_news(MARKET_NEWS_KEYWORD),
                    )
                    .await,
                )
            } else {
                None
            }
        };

        let (fetched, indexes, market_news) = tokio::join!(entity_fetches, indexes, market_news);

        let mut dataset = MarketDataset::default();

        for fetch in fetched {
            let news = match fetch.news {
                Ok(articles) => Self::assign_news_ids(fetch.ticker.as_str(), articles),
                Err(e) => {
                    dataset
                        .gaps
                        .push(Self::gap(Some(&fetch.ticker), DataSource::News, &e));
                    Vec::new()
                }
            };

            match fetch.points {
                Ok(mut points) if !points.is_empty() => {
                    points.sort_by_key(|p| p.timestamp);
                    dataset.entries.push(TickerData {
                        ticker: fetch.ticker,
                        points,
                        news,
                    });
                }
                Ok(_) => dataset.gaps.push(DataGap {
                    ticker: Some(fetch.ticker),
                    source: DataSource::PriceSeries,
                    reason: "no price points returned".to_string(),
                }),
                Err(e) => dataset.gaps.push(Self::gap(
                    Some(&fetch.ticker),
                    DataSource::PriceSeries,
                    &e,
                )),
            }
        }

        let indexes_failed = match indexes {
            Ok(values) => {
                dataset.indexes = values;
                false
            }
            Err(e) => {
                dataset.gaps.push(Self::gap(None, DataSource::Indexes, &e));
                true
            }
        };

        let market_news_failed = match market_news {
            Some(Ok(articles)) => {
                dataset.market_news = Self::assign_news_ids("market", articles);
                false
            }
            Some(Err(e)) => {
                dataset.gaps.push(Self::gap(None, DataSource::News, &e));
                true
            }
            None => false,
        };

        let unavailable = if entities.is_empty() {
            indexes_failed && market_news_failed
        } else {
            dataset.entries.is_empty()
        };

        if unavailable {
            let reasons: Vec<String> = dataset.gaps.iter().map(DataGap::describe).collect();
            return Err(Error::DataUnavailable(reasons.join("; ")));
        }

        tracing::debug!(
            entries = dataset.entries.len(),
            points = dataset.total_points(),
            gaps = dataset.gaps.len(),
            "Market data resolved"
        );

        Ok(dataset)
    }

    fn name(&self) -> &str {
        "query-agent"
    }
}
