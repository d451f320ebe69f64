//! API layer for code-tunnel.
//!
//! This module provides the HTTP and WebSocket endpoints that editor
//! clients talk to.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check with active session count
//! - `WS /ws/{session_id}` - Bidirectional execution channel
//!
//! ## Example
//!
//! ```no_run
//! use code_tunnel::api::{serve, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> code_tunnel::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 8000);
//!     serve(config).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod websocket;

// Re-export commonly used types
pub use handlers::AppState;
pub use router::{
    create_router, create_router_with_config, create_router_with_state, serve, serve_with_state,
    ServerConfig,
};
