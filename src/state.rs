//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{ShortenerService, UserAuthService};

/// Application state cloned into every request.
///
/// Services are behind `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub shortener_service: Arc<ShortenerService>,
    pub auth_service: Arc<UserAuthService>,
}

impl AppState {
    pub fn new(shortener_service: Arc<ShortenerService>, auth_service: Arc<UserAuthService>) -> Self {
        Self {
            shortener_service,
            auth_service,
        }
    }
}
