//! Precomputed ranking tables
//!
//! A ranking model stores, for every catalog row, its top neighbours under one
//! or more filtering methods. It is keyed by row index only, so it silently
//! goes stale when the catalog changes; lookups past the end of a table and
//! neighbours past the end of the catalog surface as `IndexOutOfRange`.
use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::ModelStore,
    error::{AppError, AppResult},
    models::{ContentField, FilterMethod, Neighbor},
    services::recommendations::Recommender,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingModel {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Catalog size the tables were built against
    pub catalog_len: usize,
    pub top_n: usize,
    pub content_field: ContentField,
    pub tables: BTreeMap<FilterMethod, Vec<Vec<Neighbor>>>,
}

/// Model metadata without the tables
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub catalog_len: usize,
    pub top_n: usize,
    pub content_field: ContentField,
    pub methods: Vec<FilterMethod>,
}

impl RankingModel {
    /// Ranks every catalog row under each of `methods`
    pub fn build(recommender: &Recommender, methods: &[FilterMethod]) -> AppResult<Self> {
        let catalog_len = recommender.catalog().len();
        let top_n = recommender.settings().top_n;

        let mut tables = BTreeMap::new();
        for &method in methods {
            let table = (0..catalog_len)
                .map(|index| recommender.neighbors_limited(index, method, top_n))
                .collect::<AppResult<Vec<_>>>()?;
            tables.insert(method, table);
        }

        let model = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            catalog_len,
            top_n,
            content_field: recommender.settings().content_field,
            tables,
        };

        tracing::info!(
            model_id = %model.id,
            movies = catalog_len,
            methods = ?model.methods(),
            "Built ranking model"
        );

        Ok(model)
    }

    pub fn methods(&self) -> Vec<FilterMethod> {
        self.tables.keys().copied().collect()
    }

    /// Stored neighbours of row `index`
    pub fn neighbors(&self, method: FilterMethod, index: usize) -> AppResult<&[Neighbor]> {
        let table = self.tables.get(&method).ok_or_else(|| {
            AppError::InvalidInput(format!("The ranking model has no {} rankings", method))
        })?;

        table
            .get(index)
            .map(Vec::as_slice)
            .ok_or(AppError::IndexOutOfRange {
                index,
                len: table.len(),
            })
    }

    /// Whether the model was built against a catalog of this size
    pub fn matches_catalog(&self, catalog_len: usize) -> bool {
        self.catalog_len == catalog_len
            && self.tables.values().all(|table| table.len() == catalog_len)
    }

    /// Whether content-based tables, if any, were built from this text field
    pub fn matches_content_field(&self, field: ContentField) -> bool {
        self.content_field == field || !self.tables.contains_key(&FilterMethod::ContentBased)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            id: self.id,
            created_at: self.created_at,
            catalog_len: self.catalog_len,
            top_n: self.top_n,
            content_field: self.content_field,
            methods: self.methods(),
        }
    }
}

/// Loads the stored model, if there is a usable one
///
/// A missing or unreadable model is logged and the server runs without one.
/// A model built for a different catalog size or content field is kept, with
/// a warning.
pub async fn load_model(store: &dyn ModelStore, recommender: &Recommender) -> Option<RankingModel> {
    let catalog_len = recommender.catalog().len();
    let content_field = recommender.settings().content_field;

    match store.load().await {
        Ok(model) => {
            let mut usable = true;
            if !model.matches_catalog(catalog_len) {
                usable = false;
                tracing::warn!(
                    model_id = %model.id,
                    model_movies = model.catalog_len,
                    catalog_movies = catalog_len,
                    "Ranking model was built for a different catalog; lookups may fail"
                );
            }
            if !model.matches_content_field(content_field) {
                usable = false;
                tracing::warn!(
                    model_id = %model.id,
                    model_field = ?model.content_field,
                    configured_field = ?content_field,
                    "Ranking model was built from a different content field; content-based results will differ from live"
                );
            }
            if usable {
                tracing::info!(model_id = %model.id, location = %store.location(), "Loaded ranking model");
            }
            Some(model)
        }
        Err(AppError::ModelNotFound(location)) => {
            tracing::info!(%location, "No ranking model found, serving live rankings only");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load ranking model");
            None
        }
    }
}

/// Builds a fresh model off the async runtime and persists it
pub async fn rebuild_model(
    recommender: Arc<Recommender>,
    store: &dyn ModelStore,
    methods: Vec<FilterMethod>,
) -> AppResult<RankingModel> {
    let methods = if methods.is_empty() {
        FilterMethod::ALL.to_vec()
    } else {
        methods
    };

    let model = tokio::task::spawn_blocking(move || RankingModel::build(&recommender, &methods))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    store.save(&model).await?;
    Ok(model)
}
