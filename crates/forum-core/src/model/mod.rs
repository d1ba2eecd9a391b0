//! Typed data flowing between the pipeline stages

pub mod analysis;
pub mod dataset;
pub mod insight;
pub mod profile;
pub mod query;
pub mod report;
pub mod result;

pub use analysis::{AnalysisResult, ArtifactKind, MediaArtifact, Table};
pub use dataset::{DataGap, DataSource, MarketDataset, NewsItem, PricePoint, TickerData};
pub use insight::{EvidenceKind, EvidenceRef, Insight, InsightCategory};
pub use profile::{RiskTolerance, UserProfile};
pub use query::{IntentTag, Query, Ticker, TimeRange};
pub use report::{Report, ReportReceipt, ReportRequest, ReportSource};
pub use result::{AggregatedResult, PartialFailure, QueryData, StageKind};
