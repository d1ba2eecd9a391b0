//! Per-request pipeline state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Received,
    Interpreting,
    Fetching,
    /// Media and insight stages in flight, joined before assembly
    Deriving,
    Assembled,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Interpreting => "interpreting",
            Self::Fetching => "fetching",
            Self::Deriving => "deriving",
            Self::Assembled => "assembled",
            Self::Failed => "failed",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Assembled | Self::Failed)
    }

    /// Forward-only transitions; any live state may fail
    pub fn can_advance_to(&self, next: Self) -> bool {
        match (self, next) {
            (Self::Received, Self::Interpreting)
            | (Self::Interpreting, Self::Fetching)
            | (Self::Fetching, Self::Deriving)
            | (Self::Deriving, Self::Assembled) => true,
            (current, Self::Failed) => !current.is_final(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks where one request is in the pipeline
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    state: PipelineState,
    history: Vec<PipelineState>,
    started_at: Instant,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            state: PipelineState::Received,
            history: vec![PipelineState::Received],
            started_at: Instant::now(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Move to `next`, ignoring transitions the state machine does not allow
    pub fn advance(&mut self, next: PipelineState) -> bool {
        if !self.state.can_advance_to(next) {
            tracing::warn!(from = %self.state, to = %next, "Ignoring illegal pipeline transition");
            return false;
        }
        tracing::debug!(
            from = %self.state,
            to = %next,
            elapsed_ms = self.elapsed().as_millis(),
            "Pipeline transition"
        );
        self.state = next;
        self.history.push(next);
        true
    }
}
