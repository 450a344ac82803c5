//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short ID to its original URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Errors
///
/// - 400 Bad Request if the ID is unknown
/// - 410 Gone if the owner deleted the URL
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let original_url = state.shortener_service.resolve(&id).await?;
    Ok(Redirect::temporary(&original_url))
}
