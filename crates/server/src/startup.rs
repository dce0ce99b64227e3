use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, ServerConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState, RouterOptions};
use service::{
    file::upload_store::UploadStore,
    runtime,
    storage::{DataType, JsonFileStore},
};

/// The browser client is served from anywhere during development.
fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn load_bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Wire the store, upload sink and router from a validated config.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let storage = &cfg.storage;
    runtime::ensure_env(&storage.frontend_dir, &storage.data_dir, &storage.uploads_dir).await?;

    let store = JsonFileStore::new(&storage.data_dir);
    let uploads = UploadStore::new(&storage.uploads_dir).await?;
    let data_types: Vec<&str> = DataType::ALL.iter().map(|d| d.as_str()).collect();
    info!(
        data_dir = %store.data_dir().display(),
        uploads_dir = %uploads.root().display(),
        ?data_types,
        "document store ready"
    );

    let state = AppState { store, uploads };
    Ok(routes::build_router(state, build_cors(), &RouterOptions::from(storage)))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = load_bind_addr(&cfg.server)?;
    info!(%addr, legacy_routes = cfg.storage.legacy_routes, "starting game data server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
