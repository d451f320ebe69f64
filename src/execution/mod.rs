//! Code execution engine.
//!
//! This module runs submitted code snippets in an embedded Lua 5.4
//! interpreter and captures their textual output:
//! - One fresh interpreter state per run, no bindings survive between runs
//! - `print` output collected into the stdout buffer
//! - Unhandled errors collected into the stderr buffer, never propagated
//!
//! # Example
//!
//! ```
//! use code_tunnel::execution::CodeExecutor;
//!
//! let executor = CodeExecutor::new();
//! let result = executor.run("print('hello')");
//! assert_eq!(result.stdout, "hello\n");
//! assert!(result.stderr.is_empty());
//! ```

mod executor;
mod result;

pub use executor::CodeExecutor;
pub use result::ExecutionResult;
