//! Reports stored as `<dir>/<id>.html` with `<id>.json` metadata

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_core::{Error, Report, ReportSource, ReportStore, Result};
use forum_utils::AppConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::validate_id;

/// Everything but the body, kept next to the rendered HTML
#[derive(Debug, Serialize, Deserialize)]
struct ReportMetadata {
    id: String,
    generated_at: DateTime<Utc>,
    source: ReportSource,
}

/// Write-once report store on the local filesystem
#[derive(Debug, Clone)]
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(&config.reports_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of a stored report body
    pub fn body_path(&self, report_id: &str) -> Result<PathBuf> {
        validate_id("report", report_id)?;
        Ok(self.dir.join(format!("{report_id}.html")))
    }

    fn metadata_path(&self, report_id: &str) -> PathBuf {
        self.dir.join(format!("{report_id}.json"))
    }

    async fn write_new(path: &Path, content: &[u8]) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    Error::Storage(format!("{} already exists", path.display()))
                }
                _ => e.into(),
            })?;
        file.write_all(content).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    async fn save(&self, report: &Report) -> Result<String> {
        let body_path = self.body_path(&report.id)?;
        fs::create_dir_all(&self.dir).await?;

        Self::write_new(&body_path, report.rendered_body.as_bytes()).await?;

        let metadata = ReportMetadata {
            id: report.id.clone(),
            generated_at: report.generated_at,
            source: report.source.clone(),
        };
        let written = match serde_json::to_vec_pretty(&metadata) {
            Ok(metadata) => Self::write_new(&self.metadata_path(&report.id), &metadata).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = written {
            // A body without metadata could never be loaded or rewritten
            if let Err(cleanup) = fs::remove_file(&body_path).await {
                tracing::warn!(report_id = %report.id, error = %cleanup, "Could not remove orphaned report body");
            }
            return Err(e);
        }

        tracing::info!(report_id = %report.id, path = %body_path.display(), "Report saved");
        Ok(report.id.clone())
    }

    async fn load(&self, report_id: &str) -> Result<Option<Report>> {
        let body_path = self.body_path(report_id)?;

        let rendered_body = match fs::read_to_string(&body_path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let metadata = fs::read_to_string(self.metadata_path(report_id)).await?;
        let metadata: ReportMetadata = serde_json::from_str(&metadata)
            .map_err(|e| Error::Storage(format!("report {report_id} metadata: {e}")))?;

        Ok(Some(Report {
            id: metadata.id,
            rendered_body,
            generated_at: metadata.generated_at,
            source: metadata.source,
        }))
    }
}
