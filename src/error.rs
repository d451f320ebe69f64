//! Error types for code-tunnel.

use thiserror::Error;

/// Main error type for code-tunnel operations.
#[derive(Error, Debug)]
pub enum CodeTunnelError {
    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Background execution task failed to complete.
    #[error("execution task failed: {0}")]
    ExecutionTask(String),
}

/// Convenience Result type for code-tunnel operations.
pub type Result<T> = std::result::Result<T, CodeTunnelError>;
