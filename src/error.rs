//! Error types for the relay
//!
//! Every failure a request can hit is an [`AppError`]; the endpoint boundary
//! turns it into a `{"detail": ...}` body with the matching status code.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderError;

/// Detail returned when the chat message is blank
pub const EMPTY_MESSAGE_DETAIL: &str = "Message cannot be empty.";

/// Detail returned when the provider produced no usable text
pub const EMPTY_RESPONSE_DETAIL: &str = "Received an empty response from Gemini API.";

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", EMPTY_MESSAGE_DETAIL)]
    InvalidInput,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Conversation not found.")]
    ConversationNotFound,

    #[error("{}", EMPTY_RESPONSE_DETAIL)]
    UpstreamEmpty,

    #[error("Internal Server Error: {0}")]
    UpstreamFailure(#[from] ProviderError),

    #[error("Upstream request timed out after {0:?}.")]
    UpstreamTimeout(Duration),

    #[error("Too many active conversations.")]
    ConversationLimit,
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConversationNotFound => StatusCode::NOT_FOUND,
            AppError::UpstreamEmpty | AppError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::ConversationLimit => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Short machine-readable label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput => "invalid_input",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::ConversationNotFound => "not_found",
            AppError::UpstreamEmpty => "upstream_empty",
            AppError::UpstreamFailure(_) => "upstream_failure",
            AppError::UpstreamTimeout(_) => "upstream_timeout",
            AppError::ConversationLimit => "conversation_limit",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.to_string(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
