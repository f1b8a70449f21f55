use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ApiResponse;

/// Machine-readable error codes carried in every failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    AiEngineError,
    TimeoutError,
    RateLimitError,
    InternalError,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Client input was rejected before reaching any service.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Provider answered 429.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Provider could not be reached at all.
    #[error("AI service unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Request timeout")]
    Timeout,

    /// Provider answered with a non-retryable or exhausted error status.
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Full error chain, stashed on the response so a development-only
/// middleware can expose it to the client.
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub String);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Provider { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::NotFound(_) => ErrorCode::ValidationError,
            Self::RateLimited => ErrorCode::RateLimitError,
            Self::EngineUnavailable(_) => ErrorCode::AiEngineError,
            Self::Timeout => ErrorCode::TimeoutError,
            Self::Provider { .. } | Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// The message shown to end users. Upstream failures never leak
    /// provider text here; that only goes into `ErrorDetails`.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::NotFound(message) => message.clone(),
            Self::RateLimited => {
                "You've used Clippy a lot! Please wait a moment before trying again.".to_string()
            }
            Self::EngineUnavailable(_) => {
                "AI service is temporarily unavailable. Please try again in a moment.".to_string()
            }
            Self::Timeout => {
                "Request took too long to process. Please try with shorter text.".to_string()
            }
            Self::Provider { .. } | Self::Internal(_) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = format!("{self:#}");

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            tracing::error!(status = status.as_u16(), error = %details, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %details, "request rejected");
        }

        let body = ApiResponse::<serde_json::Value>::failure(self.code(), self.public_message());
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorDetails(details));
        response
    }
}
