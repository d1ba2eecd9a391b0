//! Structured query produced by the interpreter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper-cased market symbol such as `AAPL`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// What the user is asking about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    Trend,
    Risk,
    Comparison,
    News,
    Price,
    /// No specific intent detected
    General,
}

impl IntentTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Risk => "risk",
            Self::Comparison => "comparison",
            Self::News => "news",
            Self::Price => "price",
            Self::General => "general",
        }
    }
}

/// Lookback window ending now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub lookback_days: u32,
    /// Whether the window was stated in the query text
    pub explicit: bool,
}

impl TimeRange {
    pub fn explicit(lookback_days: u32) -> Self {
        Self {
            lookback_days,
            explicit: true,
        }
    }

    pub fn implied(lookback_days: u32) -> Self {
        Self {
            lookback_days,
            explicit: false,
        }
    }

    pub fn label(&self) -> String {
        format!("last {} days", self.lookback_days)
    }
}

/// Interpreted user query, immutable once produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    raw_text: String,
    resolved_entities: Vec<Ticker>,
    time_range: TimeRange,
    intent_tag: IntentTag,
}

impl Query {
    pub fn new(
        raw_text: impl Into<String>,
        resolved_entities: Vec<Ticker>,
        time_range: TimeRange,
        intent_tag: IntentTag,
    ) -> Self {
        Self {
            raw_text: raw_text.into(),
            resolved_entities,
            time_range,
            intent_tag,
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn resolved_entities(&self) -> &[Ticker] {
        &self.resolved_entities
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn intent_tag(&self) -> IntentTag {
        self.intent_tag
    }

    /// True when the interpreter found no resolvable subject
    pub fn has_no_subject(&self) -> bool {
        self.resolved_entities.is_empty()
    }
}
