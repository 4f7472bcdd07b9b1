//! Health endpoint integration tests
//!
//! - GET /health - Process and conversation status
//! - GET /health/live - Liveness probe

use serde_json::{json, Value};

use crate::common::TestHarness;

#[tokio::test]
async fn test_liveness() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health/live").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_health_endpoint_returns_proper_structure() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["provider"], "gemini");
    assert_eq!(body["model"], "gemini-1.5-flash");
    assert_eq!(body["active_conversations"], 0);
    assert!(body["uptime_seconds"].is_u64());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_counts_conversations() {
    let harness = TestHarness::new().await;
    harness.gemini.mock_reply("hi").await;

    for id in ["a", "b", "c"] {
        harness
            .server
            .post("/chat")
            .json(&json!({"message": "hello", "conversation_id": id}))
            .await
            .assert_status_ok();
    }

    let body = harness.server.get("/health").await.json::<Value>();
    assert_eq!(body["active_conversations"], 3);
}
