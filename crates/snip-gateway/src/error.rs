use crate::model::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::ShortenerError;
use snip_redirector::RedirectorError;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::BadRequest(message) => warn!(%message, "Rejected bad request"),
            AppError::NotFound(message) => warn!(%message, "Resource not found"),
            AppError::Unavailable(message) => warn!(%message, "Backend unavailable"),
            AppError::Internal(message) => error!(%message, "Request failed"),
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error"),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        match value {
            ShortenerError::InvalidUrl(message) => AppError::BadRequest(message),
            ShortenerError::Unavailable(e) => AppError::Unavailable(e.to_string()),
            e @ ShortenerError::GenerationExhausted { .. } => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RedirectorError> for AppError {
    fn from(value: RedirectorError) -> Self {
        match value {
            RedirectorError::NotFound(code) => {
                AppError::NotFound(format!("short code '{code}' not found"))
            }
            RedirectorError::Unavailable(e) => AppError::Unavailable(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        AppError::BadRequest(value.body_text())
    }
}
