//! Report generation: the second, separate step after `process`

use forum_core::{Error, Report, ReportReceipt, ReportRequest, ReportStage, ReportStore, Result};
use serde_json::Value;
use std::sync::Arc;

/// Composes reports from caller-supplied fields and persists them
pub struct ReportPublisher {
    stage: Arc<dyn ReportStage>,
    store: Arc<dyn ReportStore>,
}

impl ReportPublisher {
    pub fn new(stage: Arc<dyn ReportStage>, store: Arc<dyn ReportStore>) -> Self {
        Self { stage, store }
    }

    /// Compose, save and return where the report can be retrieved
    pub async fn generate_report(&self, request: ReportRequest) -> Result<ReportReceipt> {
        let report = self.stage.compose(
            request.query_data.as_ref(),
            request.analysis_results.as_ref(),
            request.insights.as_deref(),
            request.user_profile.as_ref(),
        )?;
        let report_id = self.store.save(&report).await?;

        tracing::info!(report_id = %report_id, stage = self.stage.name(), "Report generated");
        Ok(ReportReceipt::for_id(report_id))
    }

    /// JSON boundary for [`ReportPublisher::generate_report`]
    pub async fn generate_report_json(&self, body: Value) -> Result<ReportReceipt> {
        self.generate_report(ReportRequest::from_json(body)?).await
    }

    pub async fn fetch_report(&self, report_id: &str) -> Result<Report> {
        self.store
            .load(report_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("report {report_id}")))
    }
}
