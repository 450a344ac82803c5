//! DTOs for the current user's URLs.

use serde::{Deserialize, Serialize};

/// A live URL owned by the requesting user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserUrlItem {
    pub short_url: String,
    pub original_url: String,
}
