//! Chat endpoint
//!
//! `POST /chat` wraps the user's message in the prompt template, relays it
//! through the caller's conversation and returns the trimmed reply.
//! `DELETE /chat/:conversation_id` forgets a conversation.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};

use crate::{
    error::{AppError, AppResult},
    prompt::build_prompt,
    provider::RequestContext,
    routes::metrics::record_request,
    session::{DEFAULT_CONVERSATION, MAX_CONVERSATION_ID_LEN},
    AppState,
};

/// Chat request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Conversation to continue; the shared default conversation when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    /// Conversation this request belongs to
    pub fn conversation(&self) -> &str {
        self.conversation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION)
    }
}

/// Chat response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
}

/// Handle chat requests
///
/// Every failure is logged once here, at the boundary, before being turned
/// into a `{"detail": ...}` response.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let start_time = Instant::now();
    let mut ctx = RequestContext::new(state.sessions.provider().name());
    let span = ctx.create_span();

    let result = relay(&state, &mut ctx, &body).instrument(span).await;
    let duration = start_time.elapsed().as_secs_f64();

    match result {
        Ok(response) => {
            record_request("success", duration);
            Ok(Json(response))
        }
        Err(e) => {
            ctx.log_error(e.kind(), &e.to_string());
            record_request(e.kind(), duration);
            Err(e)
        }
    }
}

async fn relay(
    state: &AppState,
    ctx: &mut RequestContext,
    body: &[u8],
) -> AppResult<ChatResponse> {
    let request: ChatRequest =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))?;

    let conversation_id = request.conversation().to_string();
    ctx.set_conversation(conversation_id.as_str());
    ctx.log_message_received(&request.message);

    if request.message.trim().is_empty() {
        return Err(AppError::InvalidInput);
    }
    if conversation_id.chars().count() > MAX_CONVERSATION_ID_LEN {
        return Err(AppError::InvalidBody(format!(
            "conversation_id must be at most {} characters",
            MAX_CONVERSATION_ID_LEN
        )));
    }

    let prompt = build_prompt(&request.message);
    let reply = state.sessions.submit(&conversation_id, prompt).await?;

    let cleaned = reply
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(AppError::UpstreamEmpty)?;

    ctx.log_cleaned_response(&cleaned);

    Ok(ChatResponse { response: cleaned })
}

/// Drop a conversation's history
pub async fn reset_conversation(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.reset(&conversation_id) {
        info!(conversation_id = %conversation_id, "Conversation reset");
        Ok(StatusCode::NO_CONTENT)
    } else {
        warn!(conversation_id = %conversation_id, "Reset requested for unknown conversation");
        Err(AppError::ConversationNotFound)
    }
}
