use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "subscription not found")]
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "subscription updated successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
