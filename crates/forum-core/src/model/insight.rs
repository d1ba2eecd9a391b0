//! Findings derived by the insight stage

use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResult;
use super::dataset::MarketDataset;
use super::query::Ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Trend,
    Risk,
    Momentum,
    News,
    Comparison,
    Market,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Risk => "risk",
            Self::Momentum => "momentum",
            Self::News => "news",
            Self::Comparison => "comparison",
            Self::Market => "market",
        }
    }
}

/// What an evidence identifier points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// Price series, identified by ticker
    Series,
    /// News item, identified by its assigned id
    News,
    /// Market index, identified by name
    Index,
    /// Media artifact, identified by artifact id
    Artifact,
    /// Summary table, identified by table id
    Table,
}

/// Reference into the dataset or analysis of the same result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub kind: EvidenceKind,
    pub id: String,
}

impl EvidenceRef {
    pub fn series(ticker: &Ticker) -> Self {
        Self {
            kind: EvidenceKind::Series,
            id: ticker.to_string(),
        }
    }

    pub fn news(id: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::News,
            id: id.into(),
        }
    }

    pub fn index(name: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::Index,
            id: name.into(),
        }
    }

    pub fn artifact(id: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::Artifact,
            id: id.into(),
        }
    }

    pub fn table(id: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::Table,
            id: id.into(),
        }
    }

    /// Whether the referenced item exists in the given dataset and analysis
    pub fn resolves_in(&self, dataset: &MarketDataset, analysis: Option<&AnalysisResult>) -> bool {
        match self.kind {
            EvidenceKind::Series => dataset.entry(&Ticker::new(&self.id)).is_some(),
            EvidenceKind::News => dataset.news_item(&self.id).is_some(),
            EvidenceKind::Index => dataset.indexes.contains_key(&self.id),
            EvidenceKind::Artifact => analysis.is_some_and(|a| a.artifact(&self.id).is_some()),
            EvidenceKind::Table => analysis.is_some_and(|a| a.table(&self.id).is_some()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: InsightCategory,
    /// Entity the finding is about, if any
    #[serde(default)]
    pub subject: Option<Ticker>,
    pub statement: String,
    /// Always within `0.0..=1.0`
    pub confidence: f64,
    #[serde(default)]
    pub supporting_evidence: Vec<EvidenceRef>,
}

impl Insight {
    pub fn new(category: InsightCategory, statement: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            category,
            subject: None,
            statement: statement.into(),
            confidence,
            supporting_evidence: Vec::new(),
        }
    }

    pub fn with_subject(mut self, ticker: Ticker) -> Self {
        self.subject = Some(ticker);
        self
    }

    pub fn with_evidence(mut self, evidence: EvidenceRef) -> Self {
        if !self.supporting_evidence.contains(&evidence) {
            self.supporting_evidence.push(evidence);
        }
        self
    }
}
