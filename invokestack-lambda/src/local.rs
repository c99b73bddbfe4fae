//! Local execution through a Lambda emulator
//!
//! Functions defined in the project are expected to be deployed to a local
//! emulator (RustStack listens on port 4566 by default). The emulator runs
//! the code in its own containers; this side only addresses it.

use crate::client::{AwsClientFactory, ClientFactory};
use crate::remote::{RemoteInvocationConfig, RemoteInvoker};
use async_trait::async_trait;
use aws_sdk_lambda::config::Credentials;
use invokestack_core::{DebugContext, FunctionProvider, InvokeError, Invoker, Sink};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_EMULATOR_ENDPOINT: &str = "http://localhost:4566";

const EMULATOR_REGION: &str = "us-east-1";

/// Invokes project functions on a local Lambda emulator by physical name
pub struct EmulatorInvoker<F = AwsClientFactory> {
    provider: Arc<dyn FunctionProvider>,
    invoker: RemoteInvoker<F>,
}

impl EmulatorInvoker {
    pub fn new(
        provider: Arc<dyn FunctionProvider>,
        endpoint_url: impl Into<String>,
        debug_context: Option<DebugContext>,
    ) -> Self {
        let factory = AwsClientFactory::new()
            .with_endpoint_url(endpoint_url)
            .with_credentials(Credentials::new("test", "test", None, None, "invokestack"));

        let mut config = RemoteInvocationConfig::new().with_region(EMULATOR_REGION);
        config.debug_context = debug_context;

        Self::with_invoker(provider, RemoteInvoker::with_factory(config, factory))
    }
}

impl<F: ClientFactory> EmulatorInvoker<F> {
    pub fn with_invoker(provider: Arc<dyn FunctionProvider>, invoker: RemoteInvoker<F>) -> Self {
        Self { provider, invoker }
    }
}

#[async_trait]
impl<F: ClientFactory> Invoker for EmulatorInvoker<F> {
    async fn invoke(
        &self,
        function_identifier: &str,
        event: &str,
        stdout: Sink<'_>,
        stderr: Sink<'_>,
    ) -> Result<(), InvokeError> {
        let definition = self
            .provider
            .get(function_identifier)
            .ok_or_else(|| InvokeError::FunctionNotFound(function_identifier.to_string()))?;

        debug!(
            function = %function_identifier,
            function_name = %definition.function_name,
            "Invoking function on local emulator"
        );

        self.invoker
            .invoke(&definition.function_name, event, stdout, stderr)
            .await
            .map_err(|e| {
                if e.is_transport() {
                    InvokeError::Local(e.to_string())
                } else {
                    e
                }
            })
    }
}
