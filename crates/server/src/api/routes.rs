use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{downloads, handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Downloads
        .route(
            "/downloads",
            post(downloads::create_download).get(downloads::list_downloads),
        )
        .route(
            "/downloads/{id}",
            get(downloads::get_download).delete(downloads::delete_download),
        )
        .route("/downloads/{id}/file", get(downloads::download_file))
        .route(
            "/downloads/{id}/file/{filename}",
            get(downloads::download_named_file),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
