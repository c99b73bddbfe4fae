//! Debug session context

use std::path::PathBuf;
use std::time::Duration;

/// Longest a debugger-attached invocation may legitimately block (10 hours).
///
/// Invokers never enforce this themselves; any timeout wrapped around a
/// debug-session invocation must allow at least this long.
pub const MAX_DEBUG_TIMEOUT: Duration = Duration::from_secs(36_000);

/// Settings for an invocation that pauses for a debugger to attach.
///
/// Only `debug_ports` changes invoker behaviour. The remaining fields are
/// carried for callers that launch the runtime themselves; the Lambda Invoke
/// API has nowhere to put them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugContext {
    /// Ports the debugger attaches on
    pub debug_ports: Vec<u16>,
    /// Extra arguments passed to the runtime process
    pub debug_args: Option<String>,
    /// Path to debugger files mounted into the runtime
    pub debugger_path: Option<PathBuf>,
    /// Function the session targets, when more than one is running
    pub debug_function: Option<String>,
}

impl DebugContext {
    pub fn new(debug_ports: Vec<u16>) -> Self {
        Self {
            debug_ports,
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.debug_args = Some(args.into());
        self
    }

    pub fn with_debugger_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.debugger_path = Some(path.into());
        self
    }

    /// A context only starts a debug session when an attach port is configured.
    pub fn is_active(&self) -> bool {
        !self.debug_ports.is_empty()
    }
}
