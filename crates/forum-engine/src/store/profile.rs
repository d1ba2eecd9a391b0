//! Profiles stored as `<dir>/<user_id>.json`

use async_trait::async_trait;
use forum_core::{Error, ProfileStore, Result, UserProfile};
use forum_utils::AppConfig;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::validate_id;

/// Last-write-wins profile store on the local filesystem
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(&config.profiles_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        validate_id("user", user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let path = self.path_for(user_id)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_str(&content).map_err(|e| {
            Error::InvalidInput(format!("profile {}: {e}", path.display()))
        })?;
        let mut profile = UserProfile::from_value(value)?;
        if profile.id.is_empty() {
            profile.id = user_id.to_string();
        }

        tracing::debug!(user_id, "Loaded profile");
        Ok(Some(profile))
    }

    async fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let path = self.path_for(user_id)?;
        fs::create_dir_all(&self.dir).await?;

        let content = serde_json::to_string_pretty(profile)?;
        fs::write(&path, content).await?;

        tracing::debug!(user_id, path = %path.display(), "Saved profile");
        Ok(())
    }
}
