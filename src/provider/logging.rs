//! Request logging for relayed chat turns
//!
//! Each request gets a short trace id so its "received", "cleaned response"
//! and error lines can be correlated in the log file.

use std::time::Instant;
use tracing::{error, info, Span};
use uuid::Uuid;

/// Context for tracking a chat request through the system
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Provider handling this request
    pub provider: String,
    /// Conversation the request belongs to
    pub conversation_id: Option<String>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(provider: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(),
            start_time: Instant::now(),
            provider: provider.to_string(),
            conversation_id: None,
        }
    }

    /// Attach the conversation once the request body has been read
    pub fn set_conversation(&mut self, conversation_id: impl Into<String>) {
        self.conversation_id = Some(conversation_id.into());
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log the raw incoming message
    pub fn log_message_received(&self, message: &str) {
        info!(
            trace_id = %self.trace_id,
            conversation_id = ?self.conversation_id,
            "Received message: {}",
            message
        );
    }

    /// Log the trimmed reply about to be returned
    pub fn log_cleaned_response(&self, response: &str) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            conversation_id = ?self.conversation_id,
            elapsed_ms = %self.elapsed_ms(),
            "Cleaned response: {}",
            response
        );
    }

    /// Log request failure
    pub fn log_error(&self, kind: &str, error: &str) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            conversation_id = ?self.conversation_id,
            elapsed_ms = %self.elapsed_ms(),
            kind = %kind,
            "Chat request failed: {}",
            error
        );
    }

    /// Create a tracing span for this request
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "chat_request",
            trace_id = %self.trace_id,
            provider = %self.provider,
        )
    }
}
