//! Integration tests for the relay
//!
//! These tests drive the real router in-process against a wiremock Gemini
//! server and verify the complete request/response flow.

mod conversations;
mod health;
mod startup;
