//! API request and response types

use serde::{Deserialize, Serialize};

/// Request to store one conversation turn
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub user_id: String,
    pub user_message: String,
    pub bot_response: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
