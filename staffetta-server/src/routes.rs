use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers;
use crate::AppState;

/// CORS aperto: qualsiasi origine, metodo e header.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(controllers::health))
        .route(
            "/messages",
            get(controllers::list_messages).post(controllers::create_message),
        )
        .layer(Extension(state))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
