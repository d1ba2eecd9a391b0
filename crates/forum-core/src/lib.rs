//! Core abstractions for the market forum pipeline
//!
//! This crate defines the typed data that flows between the analysis stages,
//! the traits each stage and each external collaborator implements, the
//! per-request [`StageContext`], and the error taxonomy shared by all crates.

pub mod context;
pub mod error;
pub mod model;
pub mod provider;
pub mod stage;

pub use context::StageContext;
pub use error::{Error, Result};
pub use model::{
    AggregatedResult, AnalysisResult, ArtifactKind, DataGap, DataSource, EvidenceKind,
    EvidenceRef, Insight, InsightCategory, IntentTag, MarketDataset, MediaArtifact, NewsItem,
    PartialFailure, PricePoint, Query, QueryData, Report, ReportReceipt, ReportRequest,
    ReportSource, RiskTolerance, StageKind, Table, Ticker, TickerData, TimeRange, UserProfile,
};
pub use provider::{
    IndexProvider, NewsArticle, NewsProvider, PriceSeriesProvider, ProfileStore, ReportStore,
};
pub use stage::{DataStage, InsightStage, MediaStage, QueryInterpreter, ReportStage};

#[cfg(any(test, feature = "mocks"))]
pub use provider::{
    MockIndexProvider, MockNewsProvider, MockPriceSeriesProvider, MockProfileStore,
    MockReportStore,
};
