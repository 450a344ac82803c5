//! API route configuration.

use crate::api::handlers::{
    delete_user_urls_handler, shorten_batch_handler, shorten_json_handler, user_urls_handler,
};
use crate::state::AppState;
use axum::{Router, routing::{get, post}};

/// JSON API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Shorten one URL
/// - `POST   /shorten/batch`  - Shorten many URLs at once
/// - `GET    /user/urls`      - List the current user's URLs
/// - `DELETE /user/urls`      - Queue deletion of the current user's URLs
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_json_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route(
            "/user/urls",
            get(user_urls_handler).delete(delete_user_urls_handler),
        )
}
