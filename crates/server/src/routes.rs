use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configs::StorageConfig;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use service::file::upload_store::UploadStore;
use service::storage::DocumentStore;

pub mod data;
pub mod status;
pub mod uploads;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub uploads: Arc<UploadStore>,
}

/// Filesystem roots and switches the router needs besides the state.
#[derive(Clone, Debug)]
pub struct RouterOptions {
    pub frontend_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub legacy_routes: bool,
    /// Body cap for collection saves.
    pub max_collection_bytes: usize,
    /// Body cap for the multipart upload route.
    pub max_upload_bytes: usize,
}

impl From<&StorageConfig> for RouterOptions {
    fn from(cfg: &StorageConfig) -> Self {
        Self {
            frontend_dir: PathBuf::from(&cfg.frontend_dir),
            uploads_dir: PathBuf::from(&cfg.uploads_dir),
            legacy_routes: cfg.legacy_routes,
            max_collection_bytes: cfg.max_collection_bytes,
            max_upload_bytes: cfg.max_upload_bytes,
        }
    }
}

/// Build the full application router: JSON API, uploads, static frontend with SPA fallback.
pub fn build_router(state: AppState, cors: CorsLayer, opts: &RouterOptions) -> Router {
    let collection_limit = DefaultBodyLimit::max(opts.max_collection_bytes);

    // Unknown /api/* paths answer with a JSON 404 instead of the SPA page
    let api = Router::new()
        .route("/status", get(status::status))
        .route(
            "/data/:data_type",
            get(data::get_one).post(data::put_one).layer(collection_limit),
        )
        .route("/all-data", get(data::get_all))
        .route(
            "/upload-screenshots",
            post(uploads::upload_screenshots).layer(DefaultBodyLimit::max(opts.max_upload_bytes)),
        )
        .fallback(status::api_not_found);

    let mut app = Router::new()
        .nest("/api", api)
        .route("/metrics", get(status::metrics));

    // Older clients post to /save/{data_type} and poll /status
    if opts.legacy_routes {
        app = app
            .route("/save/:data_type", post(data::put_one).layer(collection_limit))
            .route("/status", get(status::status));
    }

    let index = opts.frontend_dir.join("index.html");
    let static_dir = ServeDir::new(&opts.frontend_dir).fallback(ServeFile::new(index));

    app.nest_service("/uploads", ServeDir::new(&opts.uploads_dir))
        .fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
