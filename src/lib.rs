//! # code-tunnel
//!
//! Lightweight session-scoped code execution backend for interactive
//! editors.
//!
//! Clients open a WebSocket identified by a session token, submit code
//! snippets as JSON frames, and receive the captured standard output and
//! standard error back as discrete messages. Snippets run in an embedded
//! Lua 5.4 interpreter with a fresh state per request.
//!
//! ## Features
//!
//! - **Bidirectional channels**: JSON message envelope over WebSocket
//! - **Isolated execution**: one fresh interpreter state per request,
//!   no bindings survive between requests
//! - **Session tracking**: channels grouped by client-supplied token,
//!   with a read-only count exposed for health reporting
//! - **Lightweight**: minimal dependencies, small binary size
//!
//! ## Quick Start
//!
//! ```
//! use code_tunnel::{CodeExecutor, ChannelId, SessionRegistry};
//!
//! # fn main() -> code_tunnel::Result<()> {
//! // Run a snippet and capture its output
//! let executor = CodeExecutor::new();
//! let result = executor.run("print('hello')");
//! assert_eq!(result.stdout, "hello\n");
//!
//! // Track channels per session
//! let registry = SessionRegistry::new();
//! registry.register("my-session", ChannelId::new())?;
//! assert_eq!(registry.session_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use error::{CodeTunnelError, Result};
pub use execution::{CodeExecutor, ExecutionResult};
pub use protocol::{DecodeError, ExecuteRequest, Outbound};
pub use session::{ChannelId, SessionRegistry};
