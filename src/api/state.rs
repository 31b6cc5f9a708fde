use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    db::ModelStore,
    error::{AppError, AppResult},
    models::{FilterMethod, RankingSource, RecommendationSet},
    services::{model::rebuild_model, ModelSummary, RankingModel, Recommender},
};

/// Shared application state
///
/// The catalog and feature rows never change after startup; only the ranking
/// model can be swapped by a rebuild.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub store: Arc<dyn ModelStore>,
    pub model: Arc<RwLock<Option<RankingModel>>>,
    /// Held from build to swap so the served model is the one on disk
    rebuild: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        recommender: Arc<Recommender>,
        store: Arc<dyn ModelStore>,
        model: Option<RankingModel>,
    ) -> Self {
        Self {
            recommender,
            store,
            model: Arc::new(RwLock::new(model)),
            rebuild: Arc::new(Mutex::new(())),
        }
    }

    /// Recommends from live scores or from the loaded ranking model
    pub async fn recommend(
        &self,
        title: &str,
        method: FilterMethod,
        source: RankingSource,
    ) -> AppResult<RecommendationSet> {
        match source {
            RankingSource::Live => self.recommender.recommend(title, method),
            RankingSource::Model => {
                let model = self.model.read().await;
                let model = model
                    .as_ref()
                    .ok_or_else(|| AppError::ModelNotFound(self.store.location()))?;
                self.recommender.recommend_from_model(title, method, model)
            }
        }
    }

    /// Builds, saves and swaps in a new model, one rebuild at a time
    pub async fn rebuild_model(&self, methods: Vec<FilterMethod>) -> AppResult<ModelSummary> {
        let _guard = self.rebuild.lock().await;

        let model = rebuild_model(self.recommender.clone(), self.store.as_ref(), methods).await?;
        let summary = model.summary();
        self.replace_model(model).await;

        Ok(summary)
    }

    pub async fn replace_model(&self, model: RankingModel) {
        *self.model.write().await = Some(model);
    }

    pub async fn has_model(&self) -> bool {
        self.model.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::FileModelStore,
        services::{recommendations::tests::sample_catalog, RecommenderSettings},
    };

    fn state(dir: &tempfile::TempDir) -> AppState {
        let recommender = Arc::new(Recommender::new(sample_catalog(), RecommenderSettings::default()));
        let store: Arc<dyn ModelStore> = Arc::new(FileModelStore::new(dir.path().join("model.json")));
        AppState::new(recommender, store, None)
    }

    #[tokio::test]
    async fn test_concurrent_rebuilds_serve_the_saved_model() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let (a, b) = tokio::join!(
            state.rebuild_model(vec![FilterMethod::Collaborative]),
            state.rebuild_model(vec![FilterMethod::ContentBased]),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.id, b.id);

        let on_disk = state.store.load().await.unwrap();
        let served = state.model.read().await.as_ref().map(|model| model.id);
        assert_eq!(served, Some(on_disk.id));
    }

    #[tokio::test]
    async fn test_model_source_requires_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        assert!(!state.has_model().await);
        let result = state
            .recommend("Avatar", FilterMethod::Collaborative, RankingSource::Model)
            .await;
        assert!(matches!(result, Err(AppError::ModelNotFound(_))));
    }
}
