//! Stage traits implemented by the analysis agents
//!
//! Each stage turns typed input into one typed output. The orchestrator only
//! talks to stages through these traits, so every stage can be swapped for a
//! test double.

use async_trait::async_trait;

use crate::context::StageContext;
use crate::model::{
    AnalysisResult, Insight, MarketDataset, Query, QueryData, Report, UserProfile,
};
use crate::Result;

/// Turns raw text into a structured query without any network I/O
pub trait QueryInterpreter: Send + Sync {
    /// Fails with `MalformedQuery` only when nothing can be interpreted
    fn interpret(&self, raw_text: &str, profile: Option<&UserProfile>) -> Result<Query>;

    fn name(&self) -> &str;
}

/// Resolves a query into market data through external providers
#[async_trait]
pub trait DataStage: Send + Sync {
    /// Partial datasets are legal; fails with `DataUnavailable` only when nothing usable arrived
    async fn fetch(&self, query: &Query, ctx: &StageContext) -> Result<MarketDataset>;

    fn name(&self) -> &str;
}

/// Derives chart specifications and tables from a dataset
#[async_trait]
pub trait MediaStage: Send + Sync {
    async fn derive(&self, dataset: &MarketDataset) -> Result<AnalysisResult>;

    fn name(&self) -> &str;
}

/// Derives findings from a dataset and, when available, the media output
#[async_trait]
pub trait InsightStage: Send + Sync {
    /// `analysis` is `None` when this stage runs concurrently with the media stage
    async fn derive(
        &self,
        dataset: &MarketDataset,
        analysis: Option<&AnalysisResult>,
    ) -> Result<Vec<Insight>>;

    fn name(&self) -> &str;
}

/// Composes a report from caller-supplied fields
pub trait ReportStage: Send + Sync {
    /// Fails with `IncompleteInput` when any of the three required fields is absent
    fn compose(
        &self,
        query_data: Option<&QueryData>,
        analysis_results: Option<&AnalysisResult>,
        insights: Option<&[Insight]>,
        profile: Option<&UserProfile>,
    ) -> Result<Report>;

    fn name(&self) -> &str;
}
