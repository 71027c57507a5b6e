use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

impl CreatedResponse {
    pub fn new(id: i64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id,
        }
    }
}
