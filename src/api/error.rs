use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No JSON data provided")]
    MissingBody,

    #[error("Invalid request body: {0}")]
    MalformedRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Max {max_requests} requests per {window_secs}s")]
    RateLimited { max_requests: i64, window_secs: u64 },

    #[error("{0}")]
    Model(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingBody | ApiError::MalformedRequest(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::MissingBody | ApiError::Validation(_) => {
                json!({"success": false, "error": self.to_string()})
            }
            ApiError::MalformedRequest(detail) => json!({
                "success": false,
                "error": "Invalid request body",
                "message": detail,
            }),
            ApiError::RateLimited { .. } => json!({
                "success": false,
                "error": "Rate limit exceeded",
                "message": self.to_string(),
            }),
            ApiError::Model(detail) => json!({
                "success": false,
                "error": "Internal server error",
                "message": detail,
            }),
        };
        (self.status(), Json(body)).into_response()
    }
}
