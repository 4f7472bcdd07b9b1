//! Conversation scoping integration tests
//!
//! Verifies that history is carried per conversation id, that the default
//! conversation is shared by clients that send no id, and that
//! `DELETE /chat/:conversation_id` forgets history.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestHarness;

fn turn_roles(body: &Value) -> Vec<String> {
    body["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|content| content["role"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_second_turn_carries_first_exchange() {
    let harness = TestHarness::new().await;
    harness.gemini.mock_reply_once("Ownership moves values.").await;
    harness.gemini.mock_reply_once("Borrowing lends them.").await;

    for message in ["What is ownership?", "And borrowing?"] {
        harness
            .server
            .post("/chat")
            .json(&json!({"message": message, "conversation_id": "conv-1"}))
            .await
            .assert_status_ok();
    }

    let bodies = harness.gemini.generate_bodies().await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(turn_roles(&bodies[0]), vec!["user"]);
    assert_eq!(turn_roles(&bodies[1]), vec!["user", "model", "user"]);

    let second = &bodies[1]["contents"];
    assert!(second[0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .ends_with("Query: What is ownership?\n"));
    assert_eq!(second[1]["parts"][0]["text"], "Ownership moves values.");
    assert!(second[2]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .ends_with("Query: And borrowing?\n"));
}

#[tokio::test]
async fn test_distinct_conversations_do_not_share_history() {
    let harness = TestHarness::new().await;
    harness.gemini.mock_reply("reply").await;

    harness
        .server
        .post("/chat")
        .json(&json!({"message": "from alice", "conversation_id": "alice"}))
        .await
        .assert_status_ok();
    harness
        .server
        .post("/chat")
        .json(&json!({"message": "from bob", "conversation_id": "bob"}))
        .await
        .assert_status_ok();

    let bodies = harness.gemini.generate_bodies().await;
    assert_eq!(turn_roles(&bodies[1]), vec!["user"]);
    assert_eq!(harness.state.sessions.active_conversations(), 2);
}

#[tokio::test]
async fn test_requests_without_id_share_default_conversation() {
    let harness = TestHarness::new().await;
    harness.gemini.mock_reply("reply").await;

    for message in ["one", "two"] {
        harness
            .server
            .post("/chat")
            .json(&json!({"message": message}))
            .await
            .assert_status_ok();
    }

    let history = harness.state.sessions.history("default").await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn test_failed_first_turn_leaves_no_conversation() {
    let harness = TestHarness::new().await;
    harness.gemini.mock_error(500, "internal").await;

    harness
        .server
        .post("/chat")
        .json(&json!({"message": "hello", "conversation_id": "c"}))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    assert!(harness.state.sessions.history("c").await.is_none());
    assert_eq!(harness.state.sessions.active_conversations(), 0);
}

#[tokio::test]
async fn test_reset_conversation() {
    let harness = TestHarness::new().await;
    harness.gemini.mock_reply("reply").await;

    harness
        .server
        .post("/chat")
        .json(&json!({"message": "hello", "conversation_id": "to-reset"}))
        .await
        .assert_status_ok();

    harness
        .server
        .delete("/chat/to-reset")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    harness
        .server
        .post("/chat")
        .json(&json!({"message": "again", "conversation_id": "to-reset"}))
        .await
        .assert_status_ok();

    let bodies = harness.gemini.generate_bodies().await;
    assert_eq!(turn_roles(&bodies[1]), vec!["user"]);
}

#[tokio::test]
async fn test_reset_unknown_conversation_is_not_found() {
    let harness = TestHarness::new().await;

    let response = harness.server.delete("/chat/never-seen").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({"detail": "Conversation not found."})
    );
}

#[tokio::test]
async fn test_overlong_conversation_id_is_rejected() {
    let harness = TestHarness::new().await;
    harness.gemini.mock_reply("reply").await;

    let response = harness
        .server
        .post("/chat")
        .json(&json!({"message": "hello", "conversation_id": "x".repeat(129)}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>(),
        json!({"detail": "Invalid request body: conversation_id must be at most 128 characters"})
    );
    assert!(harness.gemini.generate_requests().await.is_empty());
    assert_eq!(harness.state.sessions.active_conversations(), 0);
}
