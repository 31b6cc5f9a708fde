use std::sync::Arc;

use marquee::{
    api::{create_router, AppState},
    config::Config,
    db::{Catalog, FileModelStore, ModelStore},
    services::{model::load_model, Recommender, RecommenderSettings},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Load the catalog and build feature rows once
    let catalog = Catalog::load(&config.data_path)?;
    let recommender = Arc::new(Recommender::new(catalog, RecommenderSettings::from(&config)));

    let store: Arc<dyn ModelStore> = Arc::new(FileModelStore::new(&config.model_path));
    let model = load_model(store.as_ref(), &recommender).await;

    let state = AppState::new(recommender, store, model);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Server running on http://{}", config.bind_addr());
    axum::serve(listener, app).await?;

    Ok(())
}
