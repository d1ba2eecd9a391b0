//! Visualisable artifacts derived by the media stage

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    LineChart,
    ComparisonChart,
}

/// Chart specification; carries data and layout, never rendered bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaArtifact {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub spec: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub media_artifacts: Vec<MediaArtifact>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.media_artifacts.is_empty() && self.tables.is_empty()
    }

    pub fn artifact(&self, id: &str) -> Option<&MediaArtifact> {
        self.media_artifacts.iter().find(|a| a.id == id)
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }
}
