//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::AppState;

// Origins of the local dev frontend
const ALLOWED_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

fn build_cors_layer() -> CorsLayer {
    let allowed: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route(
            "/api/ai/generate",
            post(handlers::generate_handler).options(handlers::preflight_handler),
        )
        .route(
            "/api/ai/proofread",
            post(handlers::proofread_handler).options(handlers::preflight_handler),
        )
        .route(
            "/api/ai/complete",
            post(handlers::complete_handler).options(handlers::preflight_handler),
        )
        .route(
            "/api/document/save",
            post(handlers::save_document_handler).options(handlers::preflight_handler),
        )
        .route(
            "/api/document/load/{doc_id}",
            get(handlers::load_document_handler).options(handlers::preflight_handler),
        )
        .layer(build_cors_layer())
        .with_state(state)
}
