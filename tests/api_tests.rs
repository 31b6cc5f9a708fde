use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use marquee::{
    api::{create_router, AppState},
    db::{Catalog, FileModelStore, ModelStore},
    models::FilterMethod,
    services::{model::load_model, RankingModel, Recommender, RecommenderSettings},
};

const DATA_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/movies.csv");

fn recommender() -> Arc<Recommender> {
    let catalog = Catalog::load(DATA_PATH).unwrap();
    Arc::new(Recommender::new(catalog, RecommenderSettings::default()))
}

async fn create_test_server(dir: &TempDir) -> TestServer {
    let recommender = recommender();
    let store: Arc<dyn ModelStore> = Arc::new(FileModelStore::new(dir.path().join("model.json")));
    let model = load_model(store.as_ref(), &recommender).await;

    let state = AppState::new(recommender, store, model);
    TestServer::new(create_router(state)).unwrap()
}

fn titles(body: &Value) -> Vec<String> {
    body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["movies"], 24);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_collaborative_recommendations() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avatar")
        .add_query_param("method", "collaborative")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched_title"], "Avatar");
    assert_eq!(body["method"], "collaborative");
    assert_eq!(body["source"], "live");

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 10);
    assert!(!titles(&body).contains(&"Avatar".to_string()));
    for (position, r) in recommendations.iter().enumerate() {
        assert_eq!(r["rank"], position + 1);
    }
}

#[tokio::test]
async fn test_content_based_recommendations_follow_genres() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Toy Story")
        .add_query_param("method", "content-based")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let top = titles(&body);
    assert_eq!(top[0], "Tangled");
    assert_eq!(top[1], "Finding Nemo");
}

#[tokio::test]
async fn test_misspelled_title_resolves() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "The Dark Knigth")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["query"], "The Dark Knigth");
    assert_eq!(body["matched_title"], "The Dark Knight");
    assert!(!titles(&body).contains(&"The Dark Knight".to_string()));
}

#[tokio::test]
async fn test_partial_title_resolves() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Blair Witch")
        .add_query_param("method", "content-based")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["matched_title"], "The Blair Witch Project");
}

#[tokio::test]
async fn test_unknown_title_is_not_found() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Qwxzv Jkpfh")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Qwxzv Jkpfh"));
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_blank_title_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_method_is_rejected() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avatar")
        .add_query_param("method", "hybrid")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_title_search() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "The Dark Knight")
        .add_query_param("limit", "2")
        .await;
    response.assert_status_ok();

    let matches: Vec<Value> = response.json();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["title"], "The Dark Knight");
    assert_eq!(matches[0]["score"], 1.0);
    assert_eq!(matches[1]["title"], "The Dark Knight Rises");
}

#[tokio::test]
async fn test_model_source_without_model() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    server
        .get("/api/v1/model")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avatar")
        .add_query_param("source", "model")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("model.json"));
}

#[tokio::test]
async fn test_model_lifecycle() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server.post("/api/v1/model").json(&json!({})).await;
    response.assert_status(StatusCode::CREATED);
    let summary: Value = response.json();
    assert_eq!(summary["catalog_len"], 24);
    assert_eq!(summary["methods"], json!(["collaborative", "content-based"]));
    assert!(dir.path().join("model.json").exists());

    let info: Value = server.get("/api/v1/model").await.json();
    assert_eq!(info["id"], summary["id"]);

    for method in ["collaborative", "content-based"] {
        let live: Value = server
            .get("/api/v1/recommendations")
            .add_query_param("title", "Inception")
            .add_query_param("method", method)
            .await
            .json();
        let stored: Value = server
            .get("/api/v1/recommendations")
            .add_query_param("title", "Inception")
            .add_query_param("method", method)
            .add_query_param("source", "model")
            .await
            .json();

        assert_eq!(stored["source"], "model");
        assert_eq!(titles(&live), titles(&stored));
    }

    // a restarted server picks the saved model up
    let restarted = create_test_server(&dir).await;
    let info: Value = restarted.get("/api/v1/model").await.json();
    assert_eq!(info["id"], summary["id"]);
}

#[tokio::test]
async fn test_model_for_single_method() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .post("/api/v1/model")
        .json(&json!({ "methods": ["content-based"] }))
        .await;
    response.assert_status(StatusCode::CREATED);

    server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Titanic")
        .add_query_param("method", "collaborative")
        .add_query_param("source", "model")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stale_model_is_a_conflict() {
    let dir = TempDir::new().unwrap();

    // model saved for the first two catalog rows only
    let full = Catalog::load(DATA_PATH).unwrap();
    let small = Recommender::new(
        Catalog::new(full.movies()[..2].to_vec()),
        RecommenderSettings::default(),
    );
    let model = RankingModel::build(&small, &[FilterMethod::Collaborative]).unwrap();
    FileModelStore::new(dir.path().join("model.json"))
        .save(&model)
        .await
        .unwrap();

    let server = create_test_server(&dir).await;
    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Titanic")
        .add_query_param("source", "model")
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_index_page_form() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("24 movies in the catalog"));
    assert!(html.contains(r#"<option value="Inception">"#));
    assert!(!html.contains("Because you watched"));
}

#[tokio::test]
async fn test_index_page_renders_recommendations() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/")
        .add_query_param("title", "Finding Nmo")
        .add_query_param("method", "content-based")
        .await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("Because you watched Finding Nemo"));
    assert!(html.contains("<td>Tangled</td>"));
    assert!(html.contains(r#"<option value="content-based" selected>"#));
}

#[tokio::test]
async fn test_index_page_shows_errors_inline() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir).await;

    let response = server
        .get("/")
        .add_query_param("title", "Qwxzv Jkpfh")
        .await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("no movie such as"));
    assert!(html.contains("Did you mean"));
}
