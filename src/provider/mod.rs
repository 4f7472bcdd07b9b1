//! Generative provider abstraction layer
//!
//! Defines the trait interface the session adapter talks to, plus the
//! conversation turn type shared with it. The only production implementation
//! is [`GeminiProvider`].

pub mod gemini;
pub mod logging;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use logging::RequestContext;

/// Author of a conversation turn, named as the provider expects
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One entry of a conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Failures raised by a provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Prompt was blocked by the provider: {0}")]
    Blocked(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

/// Trait defining the interface for generative providers
///
/// Implementations own credentials and the generation configuration; callers
/// only hand over the conversation so far.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Provider name for logging and health output
    fn name(&self) -> &'static str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Check that credentials are accepted and the model exists
    async fn verify(&self) -> Result<(), ProviderError>;

    /// Generate the next model turn for `contents`
    ///
    /// The last element of `contents` is the new user turn. Returns `None`
    /// when the provider answered without any text.
    async fn generate(&self, contents: &[Turn]) -> Result<Option<String>, ProviderError>;
}
