use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Uniform error payload: `{"status": ..., "code": ..., "error": ...}`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub http_status: StatusCode,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JsonApiError {
    pub fn new(http_status: StatusCode, status: &str, error: Option<String>) -> Self {
        Self { http_status, status: status.to_string(), code: None, error }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}

/// Every failure a user route can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound("user_not_found".into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ApiError> for JsonApiError {
    fn from(e: ApiError) -> Self {
        let status = e.status();
        match e {
            ApiError::InvalidBody(detail) => JsonApiError::new(status, "Invalid request.", Some(detail)),
            ApiError::NotFound(detail) => JsonApiError::new(status, "Resource not found.", Some(detail)),
            // cause stays in the log
            ApiError::Internal(cause) => {
                error!(err = %cause, "request failed");
                JsonApiError::new(status, "Internal server error.", None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        JsonApiError::from(self).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
