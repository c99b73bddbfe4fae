//! Remote execution adapter
//!
//! Issues one Lambda invocation and hands back at most one execution record.

use async_trait::async_trait;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{InvocationType, LogType};
use aws_sdk_lambda::Client;
use bytes::Bytes;
use invokestack_core::InvokeError;
use tracing::debug;

/// Response body of an invocation. Reading consumes it.
#[derive(Debug)]
pub struct Payload(Bytes);

impl Payload {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self(body.into())
    }

    pub fn read(self) -> Bytes {
        self.0
    }
}

/// Outcome of a single remote invocation attempt
#[derive(Debug)]
pub struct ExecutionRecord {
    pub payload: Payload,
    /// Set when the function itself reported an error (`Handled`/`Unhandled`)
    pub function_error: Option<String>,
    /// Base64-encoded tail of the runtime log
    pub log_result: Option<String>,
}

impl ExecutionRecord {
    pub fn success(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: Payload::new(payload),
            function_error: None,
            log_result: None,
        }
    }

    pub fn error(error: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: Payload::new(payload),
            function_error: Some(error.into()),
            log_result: None,
        }
    }

    pub fn with_log_result(mut self, log_result: impl Into<String>) -> Self {
        self.log_result = Some(log_result.into());
        self
    }
}

/// Issues an invocation against a provider.
///
/// Returns `Ok(None)` when the provider produced no record at all.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn execute(
        &self,
        function_identifier: &str,
        event: &str,
    ) -> Result<Option<ExecutionRecord>, InvokeError>;
}

/// Executor backed by the AWS Lambda `Invoke` API.
///
/// Payloads are returned raw, never re-rendered for humans.
pub struct LambdaInvokeExecutor {
    client: Client,
}

impl LambdaInvokeExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteExecutor for LambdaInvokeExecutor {
    async fn execute(
        &self,
        function_identifier: &str,
        event: &str,
    ) -> Result<Option<ExecutionRecord>, InvokeError> {
        debug!(function = %function_identifier, payload_size = %event.len(), "Invoking remote function");

        let output = self
            .client
            .invoke()
            .function_name(function_identifier)
            .invocation_type(InvocationType::RequestResponse)
            .log_type(LogType::Tail)
            .payload(Blob::new(event.as_bytes()))
            .send()
            .await
            .map_err(|e| InvokeError::Transport(DisplayErrorContext(e).to_string()))?;

        let payload = output
            .payload()
            .map(|blob| Bytes::copy_from_slice(blob.as_ref()))
            .unwrap_or_default();

        Ok(Some(ExecutionRecord {
            payload: Payload::new(payload),
            function_error: output.function_error().map(str::to_string),
            log_result: output.log_result().map(str::to_string),
        }))
    }
}
