//! Composed reports and the request that produces them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::analysis::AnalysisResult;
use super::insight::Insight;
use super::profile::UserProfile;
use super::query::Ticker;
use super::result::{AggregatedResult, QueryData};
use crate::error::{Error, Result};

/// Which aggregated content a report was composed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSource {
    pub raw_text: String,
    pub tickers: Vec<Ticker>,
    /// Content hash of the composed inputs
    pub fingerprint: String,
}

/// Write-once report document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub rendered_body: String,
    pub generated_at: DateTime<Utc>,
    pub source: ReportSource,
}

/// Returned to callers of `generate_report`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReceipt {
    pub report_id: String,
    /// Stable retrieval path keyed by the identifier
    pub path: String,
}

impl ReportReceipt {
    pub fn for_id(report_id: impl Into<String>) -> Self {
        let report_id = report_id.into();
        Self {
            path: format!("/reports/{report_id}"),
            report_id,
        }
    }
}

/// The caller-assembled input of the report step
///
/// Every field is optional so that absence can be reported precisely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub query_data: Option<QueryData>,
    pub analysis_results: Option<AnalysisResult>,
    pub insights: Option<Vec<Insight>>,
    pub user_profile: Option<UserProfile>,
}

impl ReportRequest {
    /// Carry the three required fields over from an aggregated result
    pub fn from_result(result: &AggregatedResult, user_profile: Option<UserProfile>) -> Self {
        Self {
            query_data: Some(result.query_data.clone()),
            analysis_results: Some(result.analysis_results.clone()),
            insights: Some(result.insights.clone()),
            user_profile,
        }
    }

    /// Parse a JSON request body; absent or null keys stay `None`
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(Error::InvalidInput(
                "report request must be a JSON object".to_string(),
            ));
        };

        fn field<T: for<'de> Deserialize<'de>>(
            map: &mut serde_json::Map<String, Value>,
            key: &str,
        ) -> Result<Option<T>> {
            match map.remove(key) {
                None | Some(Value::Null) => Ok(None),
                Some(value) => serde_json::from_value(value)
                    .map(Some)
                    .map_err(|e| Error::InvalidInput(format!("{key}: {e}"))),
            }
        }

        let query_data = field(&mut map, "query_data")?;
        let analysis_results = field(&mut map, "analysis_results")?;
        let insights = field(&mut map, "insights")?;
        let user_profile = match map.remove("user_profile") {
            None | Some(Value::Null) => None,
            Some(value) => Some(UserProfile::from_value(value)?),
        };

        Ok(Self {
            query_data,
            analysis_results,
            insights,
            user_profile,
        })
    }

    /// Names of the required fields that are absent
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.query_data.is_none() {
            missing.push("query_data".to_string());
        }
        if self.analysis_results.is_none() {
            missing.push("analysis_results".to_string());
        }
        if self.insights.is_none() {
            missing.push("insights".to_string());
        }
        missing
    }
}
