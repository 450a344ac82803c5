//! Handlers for link shortening endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::batch::{BatchRequestItem, BatchResponseItem};
use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::CurrentUser;
use crate::application::services::Shortened;
use crate::error::AppError;
use crate::state::AppState;

fn status_for(shortened: &Shortened) -> StatusCode {
    match shortened {
        Shortened::Created(_) => StatusCode::CREATED,
        Shortened::Existing(_) => StatusCode::CONFLICT,
    }
}

/// Shortens a URL sent as a plain-text body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response
///
/// - `201 Created` with the short URL as text
/// - `409 Conflict` with the existing short URL as text
///
/// # Errors
///
/// Returns 400 Bad Request for an empty body or an invalid URL.
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: String,
) -> Result<Response, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::bad_request("Request body is empty", json!({})));
    }

    let shortened = state.shortener_service.shorten(&user_id, &body).await?;
    let status = status_for(&shortened);

    Ok((status, shortened.short_url().to_string()).into_response())
}

/// Shortens a URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/EAaArVRs" }
/// ```
///
/// `201 Created` for a new URL, `409 Conflict` (same body) if it was already
/// shortened.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<ShortenRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let shortened = state
        .shortener_service
        .shorten(&user_id, &payload.url)
        .await?;
    let status = status_for(&shortened);

    let body = ShortenResponse {
        result: shortened.short_url().to_string(),
    };
    Ok((status, Json(body)).into_response())
}

/// Shortens many URLs at once.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [{ "correlation_id": "1", "original_url": "https://example.com" }]
/// ```
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// [{ "correlation_id": "1", "short_url": "http://localhost:8080/EAaArVRs" }]
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the batch is empty or any URL is invalid; in
/// that case nothing is stored.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<Vec<BatchRequestItem>>,
) -> Result<(StatusCode, Json<Vec<BatchResponseItem>>), AppError> {
    for item in &payload {
        item.validate()?;
    }

    let results = state
        .shortener_service
        .shorten_batch(&user_id, payload.into_iter().map(Into::into).collect())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(results.into_iter().map(Into::into).collect()),
    ))
}
