//! The assembled outcome of one pipeline run

use serde::{Deserialize, Serialize};
use std::fmt;

use super::analysis::AnalysisResult;
use super::dataset::MarketDataset;
use super::insight::Insight;
use super::query::Query;

/// Pipeline stage identifier used in failure records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Interpret,
    Data,
    Media,
    Insight,
    Report,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interpret => "interpret",
            Self::Data => "data",
            Self::Media => "media",
            Self::Insight => "insight",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage-local failure absorbed into the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialFailure {
    pub stage: StageKind,
    pub reason: String,
}

impl PartialFailure {
    pub fn new(stage: StageKind, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Interpreted query together with the data resolved for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryData {
    pub query: Query,
    pub dataset: MarketDataset,
}

/// Unit returned by the orchestrator and consumed by the report stage
///
/// Top-level field names are part of the external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub request_id: String,
    pub query_data: QueryData,
    pub analysis_results: AnalysisResult,
    pub insights: Vec<Insight>,
    pub partial_failures: Vec<PartialFailure>,
}

impl AggregatedResult {
    pub fn query(&self) -> &Query {
        &self.query_data.query
    }

    pub fn dataset(&self) -> &MarketDataset {
        &self.query_data.dataset
    }

    pub fn analysis(&self) -> &AnalysisResult {
        &self.analysis_results
    }

    pub fn is_complete(&self) -> bool {
        self.partial_failures.is_empty()
    }

    pub fn failures_for(&self, stage: StageKind) -> impl Iterator<Item = &PartialFailure> {
        self.partial_failures.iter().filter(move |f| f.stage == stage)
    }

    pub fn has_failure(&self, stage: StageKind) -> bool {
        self.failures_for(stage).next().is_some()
    }

    /// Whether every insight's evidence resolves within this result
    pub fn evidence_resolves(&self) -> bool {
        self.insights.iter().all(|insight| {
            insight
                .supporting_evidence
                .iter()
                .all(|e| e.resolves_in(self.dataset(), Some(&self.analysis_results)))
        })
    }

    /// Drop evidence references that do not resolve, returning how many were removed
    pub fn prune_dangling_evidence(&mut self) -> usize {
        let dataset = &self.query_data.dataset;
        let analysis = &self.analysis_results;
        let mut removed = 0;
        for insight in &mut self.insights {
            let before = insight.supporting_evidence.len();
            insight
                .supporting_evidence
                .retain(|e| e.resolves_in(dataset, Some(analysis)));
            removed += before - insight.supporting_evidence.len();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EvidenceRef, InsightCategory, IntentTag, PricePoint, Ticker, TickerData, TimeRange,
    };
    use chrono::Utc;

    fn sample() -> AggregatedResult {
        let ticker = Ticker::new("AAPL");
        AggregatedResult {
            request_id: "req-1".to_string(),
            query_data: QueryData {
                query: Query::new(
                    "AAPL trend",
                    vec![ticker.clone()],
                    TimeRange::explicit(30),
                    IntentTag::Trend,
                ),
                dataset: MarketDataset {
                    entries: vec![TickerData {
                        ticker: ticker.clone(),
                        points: vec![PricePoint::new(Utc::now(), 1.0)],
                        news: vec![],
                    }],
                    ..Default::default()
                },
            },
            analysis_results: AnalysisResult::default(),
            insights: vec![
                Insight::new(InsightCategory::Trend, "flat", 0.3)
                    .with_evidence(EvidenceRef::series(&ticker))
                    .with_evidence(EvidenceRef::artifact("chart:AAPL:price")),
            ],
            partial_failures: vec![PartialFailure::new(StageKind::Media, "boom")],
        }
    }

    #[test]
    fn test_prune_dangling_evidence() {
        let mut result = sample();
        assert!(!result.evidence_resolves());
        assert_eq!(result.prune_dangling_evidence(), 1);
        assert!(result.evidence_resolves());
        assert_eq!(result.insights[0].supporting_evidence.len(), 1);
    }

    #[test]
    fn test_contract_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        for key in ["query_data", "analysis_results", "insights", "partial_failures"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["partial_failures"][0]["stage"], "media");
        assert_eq!(json["query_data"]["query"]["raw_text"], "AAPL trend");
    }

    #[test]
    fn test_failures_for_stage() {
        let result = sample();
        assert!(result.has_failure(StageKind::Media));
        assert!(!result.has_failure(StageKind::Insight));
        assert!(!result.is_complete());
    }
}
