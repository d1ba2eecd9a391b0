//! Stage implementations
//!
//! Each agent implements one stage trait from `forum-core`:
//! - Query agent: interpretation and market data resolution
//! - Media agent: charts and summary tables
//! - Insight agent: findings with evidence
//! - Report agent: HTML report composition

pub mod insight_agent;
pub mod media_agent;
pub mod query_agent;
pub mod report_agent;

pub use insight_agent::InsightAgent;
pub use media_agent::MediaAgent;
pub use query_agent::QueryAgent;
pub use report_agent::ReportAgent;
