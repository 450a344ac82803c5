//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`        - Shorten a plain-text URL
//! - `GET  /{id}`    - Short link redirect
//! - `GET  /ping`    - Storage health check
//! - `/api/*`        - JSON API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Gzip** - Compressed JSON/HTML responses, gzip-encoded request bodies
//! - **Identity** - Signed `auth_token` cookie, issued when missing or invalid

use crate::api;
use crate::api::handlers::{ping_handler, redirect_handler, shorten_text_handler};
use crate::api::middleware::{compression, identity, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/ping", get(ping_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), identity::layer))
        .with_state(state)
        .layer(compression::request_layer())
        .layer(compression::response_layer())
        .layer(tracing::layer())
}
