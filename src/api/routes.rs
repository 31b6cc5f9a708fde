use axum::{
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{
    make_span_with_request_id, propagate_request_id_layer, set_request_id_layer,
};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/titles/search", get(handlers::search_titles))
        .route("/recommendations", get(handlers::recommend))
        .route(
            "/model",
            get(handlers::model_info).post(handlers::create_model),
        )
}
