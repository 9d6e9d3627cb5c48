use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(String),

    #[error("Invalid field '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Unusable chart data: {0}")]
    Chart(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Storage failed: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ParseError,
    ValidationError,
    ChartError,
    RenderError,
    StorageError,
    InternalError,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: &'static str,
    pub request_id: Option<String>,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Parse(_) => ErrorCode::ParseError,
            ApiError::Validation { .. } => ErrorCode::ValidationError,
            ApiError::Chart(_) => ErrorCode::ChartError,
            ApiError::Render(_) => ErrorCode::RenderError,
            ApiError::Storage(_) => ErrorCode::StorageError,
            ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Parse(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Chart(_) => StatusCode::BAD_REQUEST,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation { field, reason } => Some(serde_json::json!({
                "field": field,
                "reason": reason,
            })),
            _ => None,
        }
    }

    pub fn to_response_body(&self, request_id: Option<String>) -> ErrorResponse {
        ErrorResponse {
            status: "error",
            request_id,
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
                details: self.details(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.to_response_body(None))).into_response()
    }
}

/// Error tagged with the request id it happened under.
#[derive(Debug)]
pub struct RequestError {
    pub request_id: String,
    pub error: ApiError,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = self.error.to_response_body(Some(self.request_id));
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<serde_urlencoded::de::Error> for ApiError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<handlebars::RenderError> for ApiError {
    fn from(err: handlebars::RenderError) -> Self {
        ApiError::Render(err.to_string())
    }
}

impl From<lopdf::Error> for ApiError {
    fn from(err: lopdf::Error) -> Self {
        ApiError::Render(format!("PDF post-processing: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}
