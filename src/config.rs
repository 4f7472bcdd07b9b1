//! Configuration management for the relay
//!
//! Configuration is loaded from environment variables (optionally seeded
//! from a `.env` file by the binary).

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Sampling and output settings sent with every generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Sampling randomness
    pub temperature: f64,
    /// Nucleus sampling threshold
    pub top_p: f64,
    /// Candidate pool size
    pub top_k: u32,
    /// Hard cap on reply length
    pub max_output_tokens: u32,
    /// MIME type requested for the reply
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// File the request log is appended to
    pub log_file: String,

    /// Gemini API base URL (without the `/v1beta` suffix)
    pub gemini_api_url: String,
    /// Gemini API key
    pub gemini_api_key: String,
    /// Model used for every conversation
    pub gemini_model: String,
    /// Probe the model endpoint before serving
    pub verify_on_startup: bool,

    pub generation: GenerationConfig,

    /// Deadline for a single upstream call
    pub upstream_timeout: Duration,
    /// Idle time after which a conversation is forgotten (0 keeps them forever)
    pub session_ttl_seconds: u64,
    /// Most conversations held at once (0 = unbounded)
    pub max_conversations: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = GenerationConfig::default();

        let gemini_api_key = lookup("GEMINI_API_KEY")
            .map(|key| key.trim().to_string())
            .context("GEMINI_API_KEY must be set")?;
        if gemini_api_key.is_empty() {
            bail!("GEMINI_API_KEY must not be empty");
        }

        Ok(Self {
            host: var("RELAY_HOST", "0.0.0.0"),
            port: var("RELAY_PORT", "8000")
                .parse()
                .context("Invalid RELAY_PORT")?,
            log_file: var("RELAY_LOG_FILE", "chat_logs.log"),

            gemini_api_url: var(
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com",
            )
            .trim_end_matches('/')
            .to_string(),
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL", "gemini-1.5-flash"),
            verify_on_startup: parse_bool(&var("GEMINI_VERIFY_ON_STARTUP", "true"))
                .context("Invalid GEMINI_VERIFY_ON_STARTUP")?,

            generation: GenerationConfig {
                temperature: var("GEMINI_TEMPERATURE", &defaults.temperature.to_string())
                    .parse()
                    .context("Invalid GEMINI_TEMPERATURE")?,
                top_p: var("GEMINI_TOP_P", &defaults.top_p.to_string())
                    .parse()
                    .context("Invalid GEMINI_TOP_P")?,
                top_k: var("GEMINI_TOP_K", &defaults.top_k.to_string())
                    .parse()
                    .context("Invalid GEMINI_TOP_K")?,
                max_output_tokens: var(
                    "GEMINI_MAX_OUTPUT_TOKENS",
                    &defaults.max_output_tokens.to_string(),
                )
                .parse()
                .context("Invalid GEMINI_MAX_OUTPUT_TOKENS")?,
                response_mime_type: var(
                    "GEMINI_RESPONSE_MIME_TYPE",
                    &defaults.response_mime_type,
                ),
            },

            upstream_timeout: Duration::from_secs(
                var("UPSTREAM_TIMEOUT_SECONDS", "60")
                    .parse()
                    .context("Invalid UPSTREAM_TIMEOUT_SECONDS")?,
            ),
            session_ttl_seconds: var("SESSION_TTL_SECONDS", "86400")
                .parse()
                .context("Invalid SESSION_TTL_SECONDS")?,
            max_conversations: var("RELAY_MAX_CONVERSATIONS", "10000")
                .parse()
                .context("Invalid RELAY_MAX_CONVERSATIONS")?,
        })
    }
}

/// Parse a boolean flag, accepting `1`/`0` alongside any casing of `true`/`false`
fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Ok(other.parse::<bool>()?),
    }
}
