use serde::{Deserialize, Serialize};

/// Error envelope: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub error: String,
}

impl ApiResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Collection reads: `{"collection": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Collection<T> {
    pub collection: Vec<T>,
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(collection: Vec<T>) -> Self {
        Self { collection }
    }
}
