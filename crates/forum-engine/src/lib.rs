//! Market forum engine
//!
//! Turns a natural-language market question into an aggregated result of
//! market data, chart specifications and insights, and composes reports from
//! that result in a separate step.
//!
//! - `KeywordInterpreter`: raw text to a structured query, no I/O
//! - `QueryAgent`: fetches price series, news and indexes through provider traits
//! - `MediaAgent`: chart specs and summary tables
//! - `InsightAgent`: findings with confidence and evidence references
//! - `ReportAgent`: HTML report composition
//! - `ForumEngine`: runs one pipeline per request under a time budget
//!
//! # Example
//!
//! ```rust,no_run
//! use forum_engine::{ForumConfig, ForumEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> forum_core::Result<()> {
//!     let engine = ForumEngine::offline(Arc::new(ForumConfig::default()));
//!     let result = engine.process("AAPL trend last 30 days", None).await?;
//!     println!("{} insights", result.insights.len());
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod interface;
pub mod interpreter;
pub mod store;

pub use agents::{InsightAgent, MediaAgent, QueryAgent, ReportAgent};
pub use api::{FinnhubClient, SampleMarketData, YahooFinanceClient};
pub use cache::{CachedPriceProvider, SeriesCache};
pub use config::{ExecutionMode, ForumConfig, ForumConfigBuilder};
pub use engine::{ForumEngine, ForumEngineBuilder, PipelineState, ReportPublisher, RequestContext};
pub use error::{ProviderError, Result};
pub use interface::ApiResponse;
pub use interpreter::KeywordInterpreter;
pub use store::{FileProfileStore, FileReportStore};
