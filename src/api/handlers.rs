//! HTTP handlers and shared application state.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};

use crate::execution::CodeExecutor;
use crate::session::SessionRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub executor: Arc<CodeExecutor>,
    /// Process start time, reported by the health endpoint.
    pub started_at: Instant,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            executor: Arc::new(CodeExecutor::new()),
            started_at: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint.
///
/// Reports a read-only snapshot of the registry: the number of distinct
/// sessions with at least one open channel.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": state.registry.session_count(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}
