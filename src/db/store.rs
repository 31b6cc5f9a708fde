use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    services::model::RankingModel,
};

/// Persistence for the ranking model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Reads the stored model; `ModelNotFound` when there is none
    async fn load(&self) -> AppResult<RankingModel>;

    /// Replaces the stored model
    async fn save(&self, model: &RankingModel) -> AppResult<()>;

    /// Human-readable location for logs and error messages
    fn location(&self) -> String;
}

/// Stores the model as a JSON file
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ModelStore for FileModelStore {
    async fn load(&self) -> AppResult<RankingModel> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::ModelNotFound(self.location()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, model: &RankingModel) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // write next to the target under a per-model name, then swap it in
        let staging = self.path.with_extension(format!("json.{}.tmp", model.id));
        tokio::fs::write(&staging, serde_json::to_vec(model)?).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        tracing::info!(model_id = %model.id, path = %self.path.display(), "Saved ranking model");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
