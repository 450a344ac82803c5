//! Handlers for the current user's URLs.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::user_urls::UserUrlItem;
use crate::api::middleware::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists URLs shortened by the requesting user.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response
///
/// - `200 OK` with `[{"short_url", "original_url"}]`
/// - `204 No Content` if the user has no live URLs
pub async fn user_urls_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Response, AppError> {
    let records = state.shortener_service.user_urls(&user_id).await?;

    if records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<UserUrlItem> = records
        .into_iter()
        .map(|record| UserUrlItem {
            short_url: state.shortener_service.short_url(&record.short_url),
            original_url: record.original_url,
        })
        .collect();

    Ok(Json(items).into_response())
}

/// Queues deletion of the requesting user's URLs.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["EAaArVRs", "k3Xz9_Qa"]
/// ```
///
/// Returns `202 Accepted` once the request is queued. URLs are marked
/// deleted asynchronously; IDs the user does not own are ignored.
///
/// # Errors
///
/// Returns 400 Bad Request for an empty list.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(short_ids): Json<Vec<String>>,
) -> Result<StatusCode, AppError> {
    state
        .shortener_service
        .delete_urls(&user_id, short_ids)
        .await?;
    Ok(StatusCode::ACCEPTED)
}
