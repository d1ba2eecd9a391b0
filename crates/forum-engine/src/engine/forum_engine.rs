//! Forum engine: runs interpretation, fetching and derivation for one query

use forum_core::{
    AggregatedResult, AnalysisResult, DataStage, Error, Insight, InsightStage, MarketDataset,
    MediaStage, PartialFailure, ProfileStore, Query, QueryData, QueryInterpreter, Result,
    StageContext, StageKind, UserProfile,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::context::{PipelineState, RequestContext};
use crate::agents::{InsightAgent, MediaAgent, QueryAgent};
use crate::config::{ExecutionMode, ForumConfig};

/// Orchestrates the stages of one request
///
/// Holds only injected, immutable collaborators, so one engine can serve any
/// number of concurrent requests.
pub struct ForumEngine {
    interpreter: Arc<dyn QueryInterpreter>,
    data: Arc<dyn DataStage>,
    media: Arc<dyn MediaStage>,
    insight: Arc<dyn InsightStage>,
    profiles: Option<Arc<dyn ProfileStore>>,
    config: Arc<ForumConfig>,
}

/// Outcome of one derivation branch
enum Derived<T> {
    Done(T),
    Failed(String),
}

fn millis(duration: Duration) -> u128 {
    duration.as_millis()
}

/// Await a stage under the remaining request budget
async fn bounded<T>(ctx: &StageContext, stage: impl Future<Output = Result<T>>) -> Derived<T> {
    let budget = ctx.remaining();
    match tokio::time::timeout(budget, stage).await {
        Ok(Ok(value)) => Derived::Done(value),
        Ok(Err(e)) => Derived::Failed(e.to_string()),
        Err(_) => Derived::Failed(format!(
            "abandoned after the request budget ran out ({} ms left)",
            millis(budget)
        )),
    }
}

impl ForumEngine {
    pub fn builder() -> ForumEngineBuilder {
        ForumEngineBuilder::default()
    }

    /// Engine wired to the bundled agents and the given query agent
    pub fn with_query_agent(query_agent: Arc<QueryAgent>, config: Arc<ForumConfig>) -> Self {
        Self {
            interpreter: query_agent.clone(),
            data: query_agent,
            media: Arc::new(MediaAgent::new()),
            insight: Arc::new(InsightAgent::new()),
            profiles: None,
            config,
        }
    }

    /// Engine over seeded sample data
    pub fn offline(config: Arc<ForumConfig>) -> Self {
        Self::with_query_agent(Arc::new(QueryAgent::offline(config.clone())), config)
    }

    /// Engine over Yahoo Finance and Finnhub
    pub fn live(config: Arc<ForumConfig>) -> Self {
        Self::with_query_agent(Arc::new(QueryAgent::live(config.clone())), config)
    }

    /// Attach a profile store used by [`ForumEngine::process_for_user`]
    pub fn with_profile_store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(store);
        self
    }

    pub fn config(&self) -> &ForumConfig {
        &self.config
    }

    /// Names of the wired stages, in pipeline order
    pub fn stage_names(&self) -> [&str; 4] {
        [
            self.interpreter.name(),
            self.data.name(),
            self.media.name(),
            self.insight.name(),
        ]
    }

    /// Run the pipeline for one query
    ///
    /// Fails only with `MalformedQuery` or `DataUnavailable`; every other
    /// stage failure is recorded in `partial_failures`.
    pub async fn process(
        &self,
        raw_text: &str,
        profile: Option<UserProfile>,
    ) -> Result<AggregatedResult> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("forum_request", request_id = %request_id, query = %raw_text);
        self.run(request_id, raw_text, profile).instrument(span).await
    }

    /// Load the user's profile, then run the pipeline
    ///
    /// A missing profile, or no configured store, runs the query unpersonalised.
    pub async fn process_for_user(&self, raw_text: &str, user_id: &str) -> Result<AggregatedResult> {
        let profile = match &self.profiles {
            Some(store) => store.load(user_id).await?,
            None => None,
        };
        if profile.is_none() {
            tracing::debug!(user_id, "No stored profile");
        }
        self.process(raw_text, profile).await
    }

    /// JSON boundary: optional profile object in, aggregated result object out
    pub async fn process_query_json(
        &self,
        raw_text: &str,
        profile: Option<Value>,
    ) -> Result<Value> {
        let profile = match profile {
            None | Some(Value::Null) => None,
            Some(value) => Some(UserProfile::from_value(value)?),
        };
        let result = self.process(raw_text, profile).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn run(
        &self,
        request_id: String,
        raw_text: &str,
        profile: Option<UserProfile>,
    ) -> Result<AggregatedResult> {
        let mut request = RequestContext::new(request_id.clone());
        let ctx = StageContext::new(request_id, self.config.request_timeout)
            .with_profile(profile.map(Arc::new));

        request.advance(PipelineState::Interpreting);
        let query = match self.interpreter.interpret(raw_text, ctx.profile()) {
            Ok(query) => query,
            Err(e) => return Err(Self::fail(&mut request, e)),
        };

        request.advance(PipelineState::Fetching);
        let dataset = match self.fetch(&query, &ctx).await {
            Ok(dataset) => dataset,
            Err(e) => return Err(Self::fail(&mut request, e)),
        };

        let mut partial_failures: Vec<PartialFailure> = dataset
            .gaps
            .iter()
            .map(|gap| PartialFailure::new(StageKind::Data, gap.describe()))
            .collect();

        request.advance(PipelineState::Deriving);
        let (analysis, insights) = self.derive(&dataset, &ctx).await;

        let analysis_results = match analysis {
            Derived::Done(analysis) => analysis,
            Derived::Failed(reason) => {
                partial_failures.push(PartialFailure::new(StageKind::Media, reason));
                AnalysisResult::default()
            }
        };
        let insights = match insights {
            Derived::Done(insights) => insights,
            Derived::Failed(reason) => {
                partial_failures.push(PartialFailure::new(StageKind::Insight, reason));
                Vec::new()
            }
        };

        for failure in &partial_failures {
            tracing::warn!(stage = %failure.stage, reason = %failure.reason, "Partial failure");
        }

        let mut result = AggregatedResult {
            request_id: ctx.request_id().to_string(),
            query_data: QueryData { query, dataset },
            analysis_results,
            insights,
            partial_failures,
        };

        let pruned = result.prune_dangling_evidence();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped evidence without a target");
        }

        request.advance(PipelineState::Assembled);
        tracing::info!(
            entities = result.dataset().entries.len(),
            artifacts = result.analysis_results.media_artifacts.len(),
            insights = result.insights.len(),
            partial_failures = result.partial_failures.len(),
            elapsed_ms = millis(request.elapsed()),
            "Request assembled"
        );

        Ok(result)
    }

    fn fail(request: &mut RequestContext, error: Error) -> Error {
        request.advance(PipelineState::Failed);
        tracing::warn!(kind = error.kind(), error = %error, "Request failed");
        error
    }

    /// Fetching under its share of the budget; without a dataset nothing can be assembled
    async fn fetch(&self, query: &Query, ctx: &StageContext) -> Result<MarketDataset> {
        let fetch_ctx = ctx.child(self.config.fetch_budget());
        let budget = fetch_ctx.remaining();

        match tokio::time::timeout(budget, self.data.fetch(query, &fetch_ctx)).await {
            Ok(Ok(dataset)) => Ok(dataset),
            Ok(Err(e @ Error::DataUnavailable(_))) => Err(e),
            Ok(Err(e)) => Err(Error::DataUnavailable(e.to_string())),
            Err(_) => Err(Error::DataUnavailable(format!(
                "fetching did not finish within {} ms",
                millis(budget)
            ))),
        }
    }

    async fn derive(
        &self,
        dataset: &MarketDataset,
        ctx: &StageContext,
    ) -> (Derived<AnalysisResult>, Derived<Vec<Insight>>) {
        match self.config.execution {
            ExecutionMode::Concurrent => {
                tokio::join!(
                    bounded(ctx, self.media.derive(dataset)),
                    bounded(ctx, self.insight.derive(dataset, None)),
                )
            }
            ExecutionMode::Sequential => {
                let analysis = bounded(ctx, self.media.derive(dataset)).await;
                let available = match &analysis {
                    Derived::Done(analysis) => Some(analysis),
                    Derived::Failed(_) => None,
                };
                let insights = bounded(ctx, self.insight.derive(dataset, available)).await;
                (analysis, insights)
            }
        }
    }
}

/// Builder for [`ForumEngine`] with injected stages
#[derive(Default)]
pub struct ForumEngineBuilder {
    interpreter: Option<Arc<dyn QueryInterpreter>>,
    data: Option<Arc<dyn DataStage>>,
    media: Option<Arc<dyn MediaStage>>,
    insight: Option<Arc<dyn InsightStage>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    config: Option<ForumConfig>,
}

impl ForumEngineBuilder {
    pub fn interpreter(mut self, interpreter: Arc<dyn QueryInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn data_stage(mut self, data: Arc<dyn DataStage>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn media_stage(mut self, media: Arc<dyn MediaStage>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn insight_stage(mut self, insight: Arc<dyn InsightStage>) -> Self {
        self.insight = Some(insight);
        self
    }

    pub fn profile_store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(store);
        self
    }

    pub fn config(mut self, config: ForumConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Media and insight default to the bundled agents; interpreter and data stage are required
    pub fn build(self) -> Result<ForumEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(ForumEngine {
            interpreter: self
                .interpreter
                .ok_or_else(|| Error::Config("interpreter is required".to_string()))?,
            data: self
                .data
                .ok_or_else(|| Error::Config("data stage is required".to_string()))?,
            media: self.media.unwrap_or_else(|| Arc::new(MediaAgent::new())),
            insight: self.insight.unwrap_or_else(|| Arc::new(InsightAgent::new())),
            profiles: self.profiles,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ReportAgent;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use forum_core::{
        InsightCategory, MockIndexProvider, MockNewsProvider, MockPriceSeriesProvider,
        MockProfileStore, NewsArticle, PriceSeriesProvider, PricePoint, ReportStage, Ticker,
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    fn series(n: usize) -> Vec<PricePoint> {
        let start = Utc::now() - ChronoDuration::days(n as i64);
        (0..n)
            .map(|i| {
                let wobble = if i % 2 == 0 { 1.0 } else { -1.0 };
                PricePoint::new(start + ChronoDuration::days(i as i64), 150.0 + i as f64 + wobble)
            })
            .collect()
    }

    fn articles(n: usize) -> Vec<NewsArticle> {
        (0..n)
            .map(|i| NewsArticle {
                headline: format!("Apple headline {i}"),
                source: "wire".to_string(),
                timestamp: Utc::now() - ChronoDuration::hours(i as i64),
            })
            .collect()
    }

    fn providers(
        points: usize,
        news: usize,
    ) -> (MockPriceSeriesProvider, MockNewsProvider, MockIndexProvider) {
        let mut prices = MockPriceSeriesProvider::new();
        prices
            .expect_get_price_series()
            .returning(move |_, _| Ok(series(points)));
        let mut news_provider = MockNewsProvider::new();
        news_provider
            .expect_get_news()
            .returning(move |_| Ok(articles(news)));
        let mut indexes = MockIndexProvider::new();
        indexes.expect_get_indexes().returning(|| {
            let mut values = BTreeMap::new();
            values.insert("S&P 500".to_string(), 5200.0);
            Ok(values)
        });
        (prices, news_provider, indexes)
    }

    fn engine_with(
        (prices, news, indexes): (MockPriceSeriesProvider, MockNewsProvider, MockIndexProvider),
        config: ForumConfig,
    ) -> ForumEngine {
        let config = Arc::new(config);
        let agent = QueryAgent::new(
            Arc::new(prices),
            Arc::new(news),
            Arc::new(indexes),
            config.clone(),
        );
        ForumEngine::with_query_agent(Arc::new(agent), config)
    }

    struct FailingMedia;

    #[async_trait]
    impl MediaStage for FailingMedia {
        async fn derive(&self, _: &MarketDataset) -> Result<AnalysisResult> {
            Err(Error::Derivation {
                stage: StageKind::Media,
                reason: "renderer offline".to_string(),
            })
        }

        fn name(&self) -> &str {
            "failing-media"
        }
    }

    struct FailingInsight;

    #[async_trait]
    impl InsightStage for FailingInsight {
        async fn derive(
            &self,
            _: &MarketDataset,
            _: Option<&AnalysisResult>,
        ) -> Result<Vec<Insight>> {
            Err(Error::Derivation {
                stage: StageKind::Insight,
                reason: "model unavailable".to_string(),
            })
        }

        fn name(&self) -> &str {
            "failing-insight"
        }
    }

    struct SlowInsight;

    #[async_trait]
    impl InsightStage for SlowInsight {
        async fn derive(
            &self,
            _: &MarketDataset,
            _: Option<&AnalysisResult>,
        ) -> Result<Vec<Insight>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "slow-insight"
        }
    }

    struct SlowData;

    #[async_trait]
    impl DataStage for SlowData {
        async fn fetch(&self, _: &Query, _: &StageContext) -> Result<MarketDataset> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(MarketDataset::default())
        }

        fn name(&self) -> &str {
            "slow-data"
        }
    }

    struct HalfSlowPrices;

    #[async_trait]
    impl PriceSeriesProvider for HalfSlowPrices {
        async fn get_price_series(&self, ticker: &Ticker, _: u32) -> Result<Vec<PricePoint>> {
            if ticker.as_str() == "MSFT" {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(series(10))
        }
    }

    #[tokio::test]
    async fn test_trend_query_end_to_end() {
        let engine = engine_with(providers(30, 2), ForumConfig::default());
        let result = engine.process("AAPL trend last 30 days", None).await.unwrap();

        assert_eq!(result.query().raw_text(), "AAPL trend last 30 days");
        assert_eq!(result.dataset().total_points(), 30);
        assert_eq!(result.dataset().news_items().count(), 2);
        assert!(
            result
                .insights
                .iter()
                .any(|i| i.category == InsightCategory::Trend)
        );
        assert!(result.partial_failures.is_empty());
        assert!(result.evidence_resolves());

        let report = ReportAgent::new()
            .unwrap()
            .compose(
                Some(&result.query_data),
                Some(&result.analysis_results),
                Some(&result.insights),
                None,
            )
            .unwrap();
        assert!(!report.rendered_body.is_empty());
        assert!(report.rendered_body.contains("AAPL"));
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_provider_call() {
        let mut prices = MockPriceSeriesProvider::new();
        prices.expect_get_price_series().never();
        let mut news = MockNewsProvider::new();
        news.expect_get_news().never();
        let mut indexes = MockIndexProvider::new();
        indexes.expect_get_indexes().never();

        let engine = engine_with((prices, news, indexes), ForumConfig::default());

        let err = engine.process("", None).await.unwrap_err();
        assert!(matches!(err, Error::MalformedQuery(_)));
        let err = engine.process("   ?!", None).await.unwrap_err();
        assert!(matches!(err, Error::MalformedQuery(_)));
    }

    #[tokio::test]
    async fn test_total_data_failure_is_terminal() {
        let mut prices = MockPriceSeriesProvider::new();
        prices
            .expect_get_price_series()
            .returning(|_, _| Err(Error::Provider("quote service down".to_string())));
        let (_, news, indexes) = providers(0, 1);

        let engine = engine_with((prices, news, indexes), ForumConfig::default());
        let err = engine.process("compare AAPL vs MSFT", None).await.unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
        assert!(err.is_terminal());
    }

    #[tokio::test]
    async fn test_partial_data_is_recorded() {
        let mut prices = MockPriceSeriesProvider::new();
        prices.expect_get_price_series().returning(|ticker, _| {
            if ticker.as_str() == "MSFT" {
                Err(Error::Provider("unknown symbol".to_string()))
            } else {
                Ok(series(10))
            }
        });
        let (_, news, indexes) = providers(0, 1);

        let engine = engine_with((prices, news, indexes), ForumConfig::default());
        let result = engine.process("compare AAPL vs MSFT", None).await.unwrap();

        assert_eq!(result.dataset().entries.len(), 1);
        let data_failures: Vec<_> = result.failures_for(StageKind::Data).collect();
        assert_eq!(data_failures.len(), 1);
        assert!(data_failures[0].reason.starts_with("MSFT price series"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_slow_entity_keeps_the_rest() {
        let (_, news, indexes) = providers(0, 1);
        let config = ForumConfig::builder()
            .request_timeout(Duration::from_millis(500))
            .provider_call_timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let agent = QueryAgent::new(
            Arc::new(HalfSlowPrices),
            Arc::new(news),
            Arc::new(indexes),
            Arc::new(config.clone()),
        );
        let engine = ForumEngine::with_query_agent(Arc::new(agent), Arc::new(config));

        let result = engine.process("compare AAPL vs MSFT", None).await.unwrap();

        assert_eq!(result.dataset().tickers(), vec![Ticker::new("AAPL")]);
        let data_failures: Vec<_> = result.failures_for(StageKind::Data).collect();
        assert_eq!(data_failures.len(), 1);
        assert!(data_failures[0].reason.starts_with("MSFT price series"));
        assert!(data_failures[0].reason.contains("timed out"));
        assert!(!result.has_failure(StageKind::Media));
        assert!(result.evidence_resolves());
    }

    #[tokio::test]
    async fn test_media_failure_is_absorbed() {
        let (prices, news, indexes) = providers(30, 2);
        let agent = Arc::new(QueryAgent::new(
            Arc::new(prices),
            Arc::new(news),
            Arc::new(indexes),
            Arc::new(ForumConfig::default()),
        ));
        let engine = ForumEngine::builder()
            .interpreter(agent.clone())
            .data_stage(agent)
            .media_stage(Arc::new(FailingMedia))
            .build()
            .unwrap();

        let result = engine.process("AAPL trend last 30 days", None).await.unwrap();

        assert!(result.analysis_results.media_artifacts.is_empty());
        assert_eq!(result.partial_failures.len(), 1);
        assert_eq!(result.partial_failures[0].stage, StageKind::Media);
        assert!(result.partial_failures[0].reason.contains("renderer offline"));
        assert!(!result.insights.is_empty());
        assert!(result.evidence_resolves());
    }

    #[tokio::test]
    async fn test_insight_failure_is_absorbed() {
        let (prices, news, indexes) = providers(30, 2);
        let agent = Arc::new(QueryAgent::new(
            Arc::new(prices),
            Arc::new(news),
            Arc::new(indexes),
            Arc::new(ForumConfig::default()),
        ));
        let engine = ForumEngine::builder()
            .interpreter(agent.clone())
            .data_stage(agent)
            .insight_stage(Arc::new(FailingInsight))
            .build()
            .unwrap();

        let result = engine.process("AAPL trend", None).await.unwrap();

        assert!(result.insights.is_empty());
        assert!(!result.analysis_results.media_artifacts.is_empty());
        assert!(result.has_failure(StageKind::Insight));
        assert!(!result.has_failure(StageKind::Media));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_derivation_is_truncated() {
        let (prices, news, indexes) = providers(30, 2);
        let config = ForumConfig::builder()
            .request_timeout(Duration::from_millis(400))
            .build()
            .unwrap();
        let agent = Arc::new(QueryAgent::new(
            Arc::new(prices),
            Arc::new(news),
            Arc::new(indexes),
            Arc::new(config.clone()),
        ));
        let engine = ForumEngine::builder()
            .interpreter(agent.clone())
            .data_stage(agent)
            .insight_stage(Arc::new(SlowInsight))
            .config(config)
            .build()
            .unwrap();

        let started = tokio::time::Instant::now();
        let result = engine.process("AAPL trend", None).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(result.has_failure(StageKind::Insight));
        assert!(!result.has_failure(StageKind::Media));
        assert!(!result.analysis_results.media_artifacts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetching_is_terminal() {
        let config = ForumConfig::builder()
            .request_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let engine = ForumEngine::builder()
            .interpreter(Arc::new(crate::KeywordInterpreter::new()))
            .data_stage(Arc::new(SlowData))
            .config(config)
            .build()
            .unwrap();

        let err = engine.process("AAPL trend", None).await.unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_stage_names_are_kebab_case() {
        let engine = ForumEngine::builder()
            .interpreter(Arc::new(crate::KeywordInterpreter::new()))
            .data_stage(Arc::new(SlowData))
            .config(ForumConfig::default())
            .build()
            .unwrap();

        assert_eq!(
            engine.stage_names(),
            ["keyword-interpreter", "slow-data", "media-agent", "insight-agent"]
        );
    }

    #[tokio::test]
    async fn test_sequential_mode_cites_artifacts() {
        let config = ForumConfig::builder()
            .execution(ExecutionMode::Sequential)
            .build()
            .unwrap();
        let engine = engine_with(providers(30, 2), config);
        let result = engine.process("AAPL trend last 30 days", None).await.unwrap();

        assert!(result.insights.iter().any(|i| {
            i.supporting_evidence
                .iter()
                .any(|e| e.kind == forum_core::EvidenceKind::Artifact)
        }));
        assert!(result.evidence_resolves());
    }

    #[tokio::test]
    async fn test_evidence_always_resolves_offline() {
        let engine = ForumEngine::offline(Arc::new(ForumConfig::default()));
        for text in [
            "AAPL trend last 30 days",
            "compare MSFT vs NVDA over the past 3 months",
            "how is the market doing",
            "特斯拉最近的风险",
        ] {
            let result = engine.process(text, None).await.unwrap();
            assert_eq!(result.query().raw_text(), text);
            assert!(result.evidence_resolves(), "dangling evidence for {text}");
        }
    }

    #[tokio::test]
    async fn test_profile_lookback_applies() {
        let mut store = MockProfileStore::new();
        store
            .expect_load()
            .withf(|user_id| user_id == "alice")
            .returning(|_| {
                Ok(Some(
                    UserProfile::new("alice").with_preference("default_lookback_days", json!(60)),
                ))
            });

        let engine = engine_with(providers(60, 0), ForumConfig::default())
            .with_profile_store(Arc::new(store));
        let result = engine.process_for_user("NVDA outlook", "alice").await.unwrap();
        assert_eq!(result.query().time_range().lookback_days, 60);
    }

    #[tokio::test]
    async fn test_json_boundary() {
        let engine = engine_with(providers(10, 1), ForumConfig::default());
        let value = engine
            .process_query_json("AAPL trend", Some(json!({ "user_id": "bob" })))
            .await
            .unwrap();

        for key in ["query_data", "analysis_results", "insights", "partial_failures"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["query_data"]["query"]["raw_text"], "AAPL trend");

        let err = engine
            .process_query_json("AAPL trend", Some(json!("not an object")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_builder_requires_stages() {
        let result = ForumEngine::builder()
            .interpreter(Arc::new(crate::KeywordInterpreter::new()))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
