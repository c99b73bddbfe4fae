//! Local/remote invocation routing

use async_trait::async_trait;
use invokestack_core::{FunctionDefinition, FunctionProvider, InvokeError, Invoker, Sink};
use std::sync::Arc;
use tracing::info;

/// Where an identifier resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationTarget {
    /// Defined in the local project
    Local(FunctionDefinition),
    /// Unknown locally, assumed to exist in the remote account
    Remote,
}

/// Routes each invocation to the local executor when the function is defined
/// in the project, and to the remote invoker otherwise.
///
/// Resolution happens once per call. There is no fallback between the two
/// paths, and failures from either are returned unchanged.
pub struct InvocationRouter {
    provider: Arc<dyn FunctionProvider>,
    local: Arc<dyn Invoker>,
    remote: Arc<dyn Invoker>,
}

impl InvocationRouter {
    pub fn new(
        provider: Arc<dyn FunctionProvider>,
        local: Arc<dyn Invoker>,
        remote: Arc<dyn Invoker>,
    ) -> Self {
        Self {
            provider,
            local,
            remote,
        }
    }

    pub fn resolve(&self, function_identifier: &str) -> InvocationTarget {
        match self.provider.get(function_identifier) {
            Some(definition) => InvocationTarget::Local(definition),
            None => InvocationTarget::Remote,
        }
    }
}

#[async_trait]
impl Invoker for InvocationRouter {
    async fn invoke(
        &self,
        function_identifier: &str,
        event: &str,
        stdout: Sink<'_>,
        stderr: Sink<'_>,
    ) -> Result<(), InvokeError> {
        match self.resolve(function_identifier) {
            InvocationTarget::Local(definition) => {
                info!(
                    function = %function_identifier,
                    logical_id = %definition.logical_id,
                    "Function defined locally"
                );
                self.local
                    .invoke(function_identifier, event, stdout, stderr)
                    .await
            }
            InvocationTarget::Remote => {
                info!(function = %function_identifier, "Function not defined locally, invoking remote");
                self.remote
                    .invoke(function_identifier, event, stdout, stderr)
                    .await
            }
        }
    }
}
