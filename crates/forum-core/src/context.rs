//! Per-request context propagated between stages
//!
//! A `StageContext` carries the request identifier, the profile snapshot and
//! the deadline every stage and provider call must respect.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::model::UserProfile;

/// Context passed to stages during one request
///
/// # Example
///
/// ```
/// use forum_core::StageContext;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let ctx = StageContext::new("req-1", Duration::from_secs(5));
/// let fetch = ctx.child(Duration::from_secs(3));
///
/// assert_eq!(fetch.request_id(), "req-1");
/// assert!(fetch.deadline() <= ctx.deadline());
/// assert!(fetch.call_budget(Duration::from_secs(10)) <= Duration::from_secs(3));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct StageContext {
    request_id: String,
    deadline: Instant,
    profile: Option<Arc<UserProfile>>,
}

impl StageContext {
    /// Create a context whose deadline is `budget` from now
    pub fn new(request_id: impl Into<String>, budget: Duration) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: Instant::now() + budget,
            profile: None,
        }
    }

    /// Attach a read-only profile snapshot
    pub fn with_profile(mut self, profile: Option<Arc<UserProfile>>) -> Self {
        self.profile = profile;
        self
    }

    /// Derive a context for a sub-phase, never extending the parent deadline
    pub fn child(&self, budget: Duration) -> Self {
        let candidate = Instant::now() + budget;
        Self {
            request_id: self.request_id.clone(),
            deadline: candidate.min(self.deadline),
            profile: self.profile.clone(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_deref()
    }

    /// Time left until the deadline, zero once expired
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Allowance for a single external call: the cap, bounded by the time left
    pub fn call_budget(&self, cap: Duration) -> Duration {
        cap.min(self.remaining())
    }
}
