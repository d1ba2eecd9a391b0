//! Forum engine
//!
//! Coordination layer that runs one pipeline per request

pub mod context;
pub mod forum_engine;
pub mod publisher;

pub use context::{PipelineState, RequestContext};
pub use forum_engine::{ForumEngine, ForumEngineBuilder};
pub use publisher::ReportPublisher;
