// Slidesmith HTTP facade
// Maps routes to session store lookups and slide service calls.

pub mod error;
pub mod handlers;
pub mod models;
pub mod session_id;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::App;

/// Builds the router with tracing, permissive CORS and the configured body limit.
pub fn router(app: Arc<App>) -> Router {
    let body_limit = app.settings.server.max_body_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        // Sessions
        .route("/api/session", post(handlers::create_session).get(handlers::get_session))
        // Deck
        .route("/get_slides", get(handlers::get_slides))
        .route("/save_slides", post(handlers::save_slides))
        .route("/update_theme", post(handlers::update_theme))
        .route("/update_setting", post(handlers::update_setting))
        .route("/toggle_extension", post(handlers::toggle_extension))
        // AI
        .route("/generate_from_topic", post(handlers::generate_from_topic))
        .route("/edit_slide_ai", post(handlers::edit_slide_ai))
        .route("/api/ai/analyze", post(handlers::analyze))
        .route("/apply_suggestion", post(handlers::apply_suggestion))
        .route("/api/ai/chat", post(handlers::chat))
        // Export
        .route("/api/export", post(handlers::export))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}
