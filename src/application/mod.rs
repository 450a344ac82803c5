//! Application layer services implementing business logic.
//!
//! Services consume the repository trait and the deletion pipeline and give
//! HTTP handlers a small API that speaks [`crate::error::AppError`].
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Shortening, redirects, user listings, deletion
//! - [`services::auth_service::UserAuthService`] - Signed user identity cookies

pub mod services;
