//! HTTP routes for the relay
//!
//! This module defines all HTTP endpoints exposed by the server.

pub mod chat;
pub mod health;
pub mod metrics;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::Level;

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Development posture: any origin, method and header
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The chat handler already logs failed requests at ERROR
    let trace = TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::WARN));

    Router::new()
        .route("/chat", post(chat::chat))
        .route("/chat/:conversation_id", delete(chat::reset_conversation))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}
