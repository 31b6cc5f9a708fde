use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{FilterMethod, RankingSource, RecommendationSet, TitleMatch},
    services::{title_search, ModelSummary},
};

use super::{
    page::{self, PageContext},
    AppState,
};

// Request types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    #[serde(default = "default_method")]
    pub method: FilterMethod,
    #[serde(default)]
    pub source: RankingSource,
}

fn default_method() -> FilterMethod {
    FilterMethod::Collaborative
}

#[derive(Debug, Default, Deserialize)]
pub struct RebuildModelRequest {
    /// Methods to rank; empty means all
    #[serde(default)]
    pub methods: Vec<FilterMethod>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub title: Option<String>,
    pub method: Option<FilterMethod>,
    pub source: Option<RankingSource>,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "movies": state.recommender.catalog().len(),
        })),
    )
}

/// Closest catalog titles for a search string
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<TitleMatch>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput("Search query is empty".to_string()));
    }

    let matches = title_search::search_titles(
        state.recommender.catalog(),
        &params.q,
        params.limit,
        0.0,
    );
    Ok(Json(matches))
}

/// Top similar movies for a title
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationSet>> {
    let recommendations = state
        .recommend(&params.title, params.method, params.source)
        .await?;
    Ok(Json(recommendations))
}

/// Metadata of the loaded ranking model
pub async fn model_info(State(state): State<AppState>) -> AppResult<Json<ModelSummary>> {
    let model = state.model.read().await;
    model
        .as_ref()
        .map(|model| Json(model.summary()))
        .ok_or_else(|| AppError::ModelNotFound(state.store.location()))
}

/// Rebuilds the ranking model, saves it and starts serving it
pub async fn create_model(
    State(state): State<AppState>,
    Json(request): Json<RebuildModelRequest>,
) -> AppResult<(StatusCode, Json<ModelSummary>)> {
    let summary = state.rebuild_model(request.methods).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// The single-page recommendation form
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let catalog = state.recommender.catalog();
    let query = params.title.as_deref().unwrap_or("");

    let mut context = PageContext {
        movie_count: catalog.len(),
        titles: catalog.titles().collect(),
        model_loaded: state.has_model().await,
        query,
        method: params.method.unwrap_or_else(default_method),
        source: params.source.unwrap_or_default(),
        result: None,
        error: None,
        suggestions: Vec::new(),
    };

    if params.title.is_some() {
        match state.recommend(query, context.method, context.source).await {
            Ok(result) => context.result = Some(result),
            Err(e) => {
                tracing::warn!(error = %e, query, "Recommendation failed");
                context = context.with_error(e);
            }
        }
    }

    Ok(Html(page::render(&context)?))
}
