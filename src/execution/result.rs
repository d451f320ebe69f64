//! Execution result types.

use std::time::Duration;

/// Captured output of one code run.
///
/// Both buffers may be empty. A run that raised an unhandled error still
/// produces a result: the error's description is appended to `stderr` and
/// any output written before the error is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Everything the snippet printed to standard output.
    pub stdout: String,
    /// Everything the snippet wrote to standard error, including the
    /// description of an unhandled error if one occurred.
    pub stderr: String,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            duration,
        }
    }

    /// Whether the run produced any standard output.
    pub fn has_stdout(&self) -> bool {
        !self.stdout.is_empty()
    }

    /// Whether the run produced any standard error output.
    pub fn has_stderr(&self) -> bool {
        !self.stderr.is_empty()
    }

    /// Whether the run completed without writing to standard error.
    pub fn is_clean(&self) -> bool {
        self.stderr.is_empty()
    }
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::ZERO,
        }
    }
}
