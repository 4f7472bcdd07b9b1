//! Startup integration tests
//!
//! `AppState::new` probes the configured model and refuses to build state
//! when the provider rejects the credentials or cannot be reached.

use gemini_relay::AppState;
use tokio_test::assert_ok;

use crate::common::test_config;
use crate::mocks::MockGemini;

#[tokio::test]
async fn test_startup_verifies_model() {
    let gemini = MockGemini::start().await;
    gemini.mock_model_found().await;

    let state = assert_ok!(AppState::new(test_config(&gemini.uri())).await);
    assert_eq!(state.sessions.active_conversations(), 0);
}

#[tokio::test]
async fn test_startup_fails_on_rejected_key() {
    let gemini = MockGemini::start().await;
    gemini.mock_model_invalid_key().await;

    let err = AppState::new(test_config(&gemini.uri()))
        .await
        .err()
        .expect("startup should fail");
    let chain = format!("{:#}", err);
    assert!(chain.contains("Failed to initialize Gemini model or chat session"));
    assert!(chain.contains("API key not valid"));
}

#[tokio::test]
async fn test_startup_fails_when_provider_unreachable() {
    // Nothing listens on port 9 (discard) in the test environment
    let config = test_config("http://127.0.0.1:9");

    assert!(AppState::new(config).await.is_err());
}

#[tokio::test]
async fn test_startup_probe_can_be_disabled() {
    let mut config = test_config("http://127.0.0.1:9");
    config.verify_on_startup = false;

    assert_ok!(AppState::new(config).await);
}
