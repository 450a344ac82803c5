//! DTOs for batch shortening.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{BatchEntry, BatchResult};

/// One URL in a batch request. `correlation_id` is echoed back untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchRequestItem {
    #[validate(length(min = 1, message = "correlation_id must not be empty"))]
    pub correlation_id: String,
    pub original_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponseItem {
    pub correlation_id: String,
    pub short_url: String,
}

impl From<BatchRequestItem> for BatchEntry {
    fn from(item: BatchRequestItem) -> Self {
        Self {
            correlation_id: item.correlation_id,
            original_url: item.original_url,
        }
    }
}

impl From<BatchResult> for BatchResponseItem {
    fn from(result: BatchResult) -> Self {
        Self {
            correlation_id: result.correlation_id,
            short_url: result.short_url,
        }
    }
}
