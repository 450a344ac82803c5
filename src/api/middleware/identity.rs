//! Cookie-based user identity middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::application::services::{AUTH_COOKIE, UserAuthService};
use crate::error::AppError;
use crate::state::AppState;

/// Lifetime of an issued cookie: one year.
const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// ID of the user making the request.
///
/// Inserted into request extensions by [`layer`]; handlers take it as an
/// extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .filter(|user| !user.0.is_empty())
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Request has no user identity" }),
                )
            })
    }
}

/// Identifies the user behind a request.
///
/// # Flow
///
/// 1. Read the `auth_token` cookie and verify its signature
/// 2. If it is missing or invalid, generate a new user ID
/// 3. Store [`CurrentUser`] in request extensions
/// 4. For new IDs, append a `Set-Cookie` header to the response
///
/// Never rejects a request.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let verified = auth_cookie(req.headers()).and_then(|token| st.auth_service.verify_token(token));

    let (user_id, issued) = match verified {
        Some(user_id) => (user_id, false),
        None => (UserAuthService::new_user_id(), true),
    };

    req.extensions_mut().insert(CurrentUser(user_id.clone()));
    let mut response = next.run(req).await;

    if issued {
        let cookie = format!(
            "{AUTH_COOKIE}={}; Path=/; HttpOnly; Max-Age={COOKIE_MAX_AGE_SECS}",
            st.auth_service.issue_token(&user_id)
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
                tracing::debug!(user_id = %user_id, "Issued new user cookie");
            }
            Err(e) => tracing::error!(error = %e, "Failed to build auth cookie"),
        }
    }

    response
}

/// Finds the `auth_token` value among the request's `Cookie` headers.
fn auth_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value)
}
