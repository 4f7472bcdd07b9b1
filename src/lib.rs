//! Gemini Relay - conversational HTTP relay for the Gemini API
//!
//! This library provides the core of the relay server: it validates chat
//! requests, wraps them in a fixed prompt template, forwards them through a
//! per-conversation session to the generative provider and returns the
//! trimmed reply.

pub mod config;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod routes;
pub mod session;
pub mod telemetry;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub use crate::config::{Config, GenerationConfig};
pub use crate::provider::{GeminiProvider, GenerativeProvider};
pub use crate::session::SessionManager;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Conversations and the provider they talk to
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails when the HTTP client cannot be built or, with startup
    /// verification enabled, when the provider rejects the credentials or
    /// cannot be reached. The server must not start in either case.
    pub async fn new(config: Config) -> Result<Self> {
        // No overall request timeout here; the session adapter applies its own deadline
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let provider: Arc<dyn GenerativeProvider> =
            Arc::new(GeminiProvider::new(http_client, &config));

        if config.verify_on_startup {
            provider
                .verify()
                .await
                .context("Failed to initialize Gemini model or chat session")?;
        }

        Ok(Self::with_provider(config, provider))
    }

    /// Create application state around an already constructed provider
    pub fn with_provider(config: Config, provider: Arc<dyn GenerativeProvider>) -> Self {
        let sessions = Arc::new(SessionManager::new(
            provider,
            config.upstream_timeout,
            config.session_ttl_seconds,
            config.max_conversations,
        ));

        Self {
            config,
            start_time: Instant::now(),
            sessions,
        }
    }
}
