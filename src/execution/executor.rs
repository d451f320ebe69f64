//! The code execution unit.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use mlua::{Function, Lua, Value, Variadic};

use super::result::ExecutionResult;
use crate::error::CodeTunnelError;
use crate::Result;

/// Chunk name reported in Lua error messages.
const CHUNK_NAME: &str = "input";

/// Runs code snippets in a fresh interpreter state per call.
///
/// The executor itself is stateless: every [`run`](Self::run) builds a new
/// Lua state and drops it when the call returns, so repeated requests never
/// observe each other's bindings. Errors raised by the snippet are captured
/// into the result's stderr buffer and never propagate to the caller.
#[derive(Debug, Default, Clone)]
pub struct CodeExecutor;

impl CodeExecutor {
    /// Create a new code executor.
    pub fn new() -> Self {
        Self
    }

    /// Run one code snippet to completion and capture its output.
    ///
    /// This call is synchronous and blocks the calling thread for the
    /// whole run. There is no timeout and no resource ceiling; callers on
    /// an async runtime should isolate it on a blocking worker (see
    /// [`run_async`](Self::run_async)).
    pub fn run(&self, code: &str) -> ExecutionResult {
        let start = Instant::now();
        let stdout = Arc::new(Mutex::new(String::new()));
        let mut stderr = String::new();

        if let Err(e) = eval(code, Arc::clone(&stdout)) {
            stderr.push_str(&e.to_string());
        }

        let stdout = stdout.lock().map(|buf| buf.clone()).unwrap_or_default();
        ExecutionResult::new(stdout, stderr, start.elapsed())
    }

    /// Run one code snippet on a blocking worker thread.
    ///
    /// Keeps the async runtime responsive while a snippet executes: other
    /// channels can still be serviced during a long run.
    pub async fn run_async(&self, code: String) -> Result<ExecutionResult> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.run(&code))
            .await
            .map_err(|e| CodeTunnelError::ExecutionTask(e.to_string()))
    }
}

/// Build a fresh interpreter state, wire `print` into the stdout buffer,
/// and execute the snippet.
fn eval(code: &str, stdout: Arc<Mutex<String>>) -> mlua::Result<()> {
    let lua = Lua::new();

    // Keep the untouched tostring builtin in the registry so snippet-level
    // shadowing of the global cannot alter print's formatting.
    let tostring: Function = lua.globals().get("tostring")?;
    lua.set_named_registry_value("builtin_tostring", tostring)?;

    let print = lua.create_function(move |lua, args: Variadic<Value>| {
        // Coerce before locking: a __tostring metamethod may call print.
        let mut line = String::new();
        let tostring: Function = lua.named_registry_value("builtin_tostring")?;
        for (i, value) in args.into_iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            let text: mlua::String = tostring.call(value)?;
            line.push_str(&text.to_string_lossy());
        }
        line.push('\n');

        let mut buf = stdout
            .lock()
            .map_err(|_| mlua::Error::external("stdout buffer poisoned"))?;
        buf.push_str(&line);
        Ok(())
    })?;
    lua.globals().set("print", print)?;

    lua.load(code).set_name(CHUNK_NAME).exec()
}
