//! Storage health check.

use axum::{extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

/// `GET /ping`: 200 if storage is reachable, 500 otherwise.
pub async fn ping_handler(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.shortener_service.ping().await?;
    Ok(StatusCode::OK)
}
