//! The invocation contract shared by local and remote execution paths

use crate::error::InvokeError;
use crate::sink::OutputSink;
use async_trait::async_trait;

/// Optional output channel. `None` drops that channel's data.
pub type Sink<'a> = Option<&'a mut (dyn OutputSink + Send)>;

/// Invokes a function with an event and forwards its output.
///
/// The returned future resolves only once the invocation has fully completed.
/// Function output goes to `stdout`, runtime diagnostics to `stderr`.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(
        &self,
        function_identifier: &str,
        event: &str,
        stdout: Sink<'_>,
        stderr: Sink<'_>,
    ) -> Result<(), InvokeError>;
}
