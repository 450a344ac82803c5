//! Business logic services for the application layer.

pub mod auth_service;
pub mod shortener_service;

pub use auth_service::{AUTH_COOKIE, UserAuthService};
pub use shortener_service::{BatchEntry, BatchResult, Shortened, ShortenerService};
