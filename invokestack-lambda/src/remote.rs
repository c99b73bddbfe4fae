//! Remote invocation of functions deployed to an AWS account

use crate::client::{AwsClientFactory, ClientFactory};
use crate::executor::ExecutionRecord;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use bytes::Bytes;
use invokestack_core::{DebugContext, InvokeError, Invoker, Sink};
use tracing::{debug, info, warn};

/// Where and how remote invocations run. Immutable once the invoker is built.
#[derive(Debug, Clone, Default)]
pub struct RemoteInvocationConfig {
    /// Named credentials profile
    pub profile: Option<String>,
    pub region: Option<String>,
    pub debug_context: Option<DebugContext>,
}

impl RemoteInvocationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_debug_context(mut self, debug_context: DebugContext) -> Self {
        self.debug_context = Some(debug_context);
        self
    }
}

/// Invokes functions that only exist in the remote account.
///
/// Each call builds a client, issues a single synchronous invocation and
/// consumes its one execution record. Successful payloads are written to
/// `stdout` byte for byte. Function errors write a notice and the raw error
/// payload to `stderr` and fail with [`InvokeError::Function`].
///
/// Safe to reuse across sequential calls; the config is read-only.
pub struct RemoteInvoker<F = AwsClientFactory> {
    config: RemoteInvocationConfig,
    factory: F,
}

impl RemoteInvoker {
    pub fn new(config: RemoteInvocationConfig) -> Self {
        Self::with_factory(config, AwsClientFactory::default())
    }
}

impl<F: ClientFactory> RemoteInvoker<F> {
    pub fn with_factory(config: RemoteInvocationConfig, factory: F) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &RemoteInvocationConfig {
        &self.config
    }

    /// Whether a debugger is expected to attach to this invocation.
    ///
    /// Only gates extra diagnostics; it never changes how the call runs.
    pub fn is_debugging(&self) -> bool {
        self.config
            .debug_context
            .as_ref()
            .is_some_and(DebugContext::is_active)
    }

    /// Build the error for a failed function. In a debug session the decoded
    /// log tail is emitted at `debug` level and attached to the error.
    fn function_error(&self, error: String, payload: Bytes, log_result: Option<&str>) -> InvokeError {
        let failure = InvokeError::function_error(error, payload);
        if !self.is_debugging() {
            return failure;
        }

        match log_result.and_then(decode_log_result) {
            Some(log) => {
                debug!("Remote invoke failed:");
                debug!("{}", String::from_utf8_lossy(&log));
                failure.with_log_result(log)
            }
            None => failure,
        }
    }
}

/// Best-effort decode of the base64 log tail. Never masks the primary error.
fn decode_log_result(encoded: &str) -> Option<Bytes> {
    match general_purpose::STANDARD.decode(encoded) {
        Ok(log) => Some(Bytes::from(log)),
        Err(e) => {
            warn!(error = %e, "Failed to decode runtime log result");
            None
        }
    }
}

#[async_trait]
impl<F: ClientFactory> Invoker for RemoteInvoker<F> {
    async fn invoke(
        &self,
        function_identifier: &str,
        event: &str,
        stdout: Sink<'_>,
        stderr: Sink<'_>,
    ) -> Result<(), InvokeError> {
        info!(function = %function_identifier, "Invoking function remotely");

        let executor = self
            .factory
            .build(self.config.region.as_deref(), self.config.profile.as_deref())
            .await?;

        let Some(record) = executor.execute(function_identifier, event).await? else {
            if let Some(stderr) = stderr {
                stderr.write_str("Remote invoke failed.");
            }
            return Err(InvokeError::EmptyResponse);
        };

        let ExecutionRecord {
            payload,
            function_error,
            log_result,
        } = record;
        let payload = payload.read();

        match function_error {
            Some(error) => {
                if let Some(stderr) = stderr {
                    stderr.write_str("Remote invoke failed");
                    stderr.write_bytes(&payload);
                }
                Err(self.function_error(error, payload, log_result.as_deref()))
            }
            None => {
                if let Some(stdout) = stdout {
                    stdout.write_bytes(&payload);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RemoteExecutor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const LOG_TAIL: &str = "START RequestId: 42\nValueError: boom\nEND RequestId: 42\n";

    #[derive(Default)]
    struct Counters {
        builds: AtomicUsize,
        executions: AtomicUsize,
    }

    struct FakeExecutor {
        record: Mutex<Option<ExecutionRecord>>,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl RemoteExecutor for FakeExecutor {
        async fn execute(
            &self,
            _function_identifier: &str,
            _event: &str,
        ) -> Result<Option<ExecutionRecord>, InvokeError> {
            self.counters.executions.fetch_add(1, Ordering::SeqCst);
            Ok(self.record.lock().unwrap().take())
        }
    }

    struct FakeFactory {
        record: Mutex<Option<ExecutionRecord>>,
        counters: Arc<Counters>,
        fail_build: bool,
    }

    impl FakeFactory {
        fn returning(record: Option<ExecutionRecord>) -> Self {
            Self {
                record: Mutex::new(record),
                counters: Arc::new(Counters::default()),
                fail_build: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_build: true,
                ..Self::returning(None)
            }
        }
    }

    #[async_trait]
    impl ClientFactory for FakeFactory {
        async fn build(
            &self,
            _region: Option<&str>,
            profile: Option<&str>,
        ) -> Result<Box<dyn RemoteExecutor>, InvokeError> {
            self.counters.builds.fetch_add(1, Ordering::SeqCst);
            if self.fail_build {
                return Err(InvokeError::Configuration(format!(
                    "profile '{}' not found",
                    profile.unwrap_or_default()
                )));
            }
            Ok(Box::new(FakeExecutor {
                record: Mutex::new(self.record.lock().unwrap().take()),
                counters: self.counters.clone(),
            }))
        }
    }

    fn sink(buffer: &mut Vec<u8>) -> Sink<'_> {
        Some(buffer)
    }

    fn invoker(record: Option<ExecutionRecord>) -> RemoteInvoker<FakeFactory> {
        RemoteInvoker::with_factory(RemoteInvocationConfig::new(), FakeFactory::returning(record))
    }

    fn debugging_invoker(record: ExecutionRecord) -> RemoteInvoker<FakeFactory> {
        RemoteInvoker::with_factory(
            RemoteInvocationConfig::new().with_debug_context(DebugContext::new(vec![5858])),
            FakeFactory::returning(Some(record)),
        )
    }

    #[tokio::test]
    async fn test_success_writes_payload_verbatim() {
        let payload: &[u8] = b"{\"statusCode\":200}\xff\x00";
        let invoker = invoker(Some(ExecutionRecord::success(payload)));
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        invoker
            .invoke("HelloWorld", "{}", sink(&mut stdout), sink(&mut stderr))
            .await
            .unwrap();

        assert_eq!(stdout, payload);
        assert!(stderr.is_empty());
        assert_eq!(invoker.factory.counters.builds.load(Ordering::SeqCst), 1);
        assert_eq!(invoker.factory.counters.executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_function_error_writes_notice_then_payload() {
        let payload = br#"{"errorMessage":"boom","errorType":"ValueError"}"#;
        let invoker = invoker(Some(ExecutionRecord::error("Unhandled", &payload[..])));
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let err = invoker
            .invoke("HelloWorld", "{}", sink(&mut stdout), sink(&mut stderr))
            .await
            .unwrap_err();

        assert!(stdout.is_empty());
        let mut expected = b"Remote invoke failed".to_vec();
        expected.extend_from_slice(payload);
        assert_eq!(stderr, expected);

        match err {
            InvokeError::Function {
                message,
                payload: error_payload,
                log_result,
            } => {
                assert_eq!(message, "Unhandled");
                assert_eq!(&error_payload[..], &payload[..]);
                assert!(log_result.is_none());
            }
            other => panic!("expected function error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_function_error_without_stderr() {
        let invoker = invoker(Some(ExecutionRecord::error("Handled", "{}")));

        let err = invoker.invoke("HelloWorld", "{}", None, None).await.unwrap_err();

        assert!(err.is_function_error());
    }

    #[tokio::test]
    async fn test_success_without_stdout() {
        let invoker = invoker(Some(ExecutionRecord::success("\"ok\"")));

        invoker.invoke("HelloWorld", "{}", None, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_response_is_transport_failure() {
        let invoker = invoker(None);
        let mut stderr = Vec::new();

        let err = invoker
            .invoke("HelloWorld", "{}", None, sink(&mut stderr))
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::EmptyResponse));
        assert!(err.is_transport());
        assert_eq!(stderr, b"Remote invoke failed.");
        assert_eq!(invoker.factory.counters.executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_response_without_stderr() {
        let err = invoker(None).invoke("HelloWorld", "{}", None, None).await.unwrap_err();

        assert!(matches!(err, InvokeError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_client_build_failure_propagates() {
        let invoker = RemoteInvoker::with_factory(
            RemoteInvocationConfig::new().with_profile("missing"),
            FakeFactory::failing(),
        );
        let mut stderr = Vec::new();

        let err = invoker
            .invoke("HelloWorld", "{}", None, sink(&mut stderr))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Failed to configure client: profile 'missing' not found");
        assert_eq!(invoker.factory.counters.executions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_is_debugging() {
        assert!(!invoker(None).is_debugging());

        let inactive = RemoteInvoker::with_factory(
            RemoteInvocationConfig::new().with_debug_context(DebugContext::default()),
            FakeFactory::returning(None),
        );
        assert!(!inactive.is_debugging());

        assert!(debugging_invoker(ExecutionRecord::success("")).is_debugging());
    }

    #[tokio::test]
    async fn test_debugging_attaches_decoded_log() {
        let record = ExecutionRecord::error("Unhandled", "{}")
            .with_log_result(general_purpose::STANDARD.encode(LOG_TAIL));
        let invoker = debugging_invoker(record);
        let mut stderr = Vec::new();

        let err = invoker
            .invoke("HelloWorld", "{}", None, sink(&mut stderr))
            .await
            .unwrap_err();

        assert_eq!(stderr, b"Remote invoke failed{}");
        match err {
            InvokeError::Function { log_result, .. } => {
                assert_eq!(log_result.as_deref(), Some(LOG_TAIL.as_bytes()));
            }
            other => panic!("expected function error, got {other:?}"),
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn capture_debug_logs(logs: &CapturedLogs) -> tracing::subscriber::DefaultGuard {
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_debugging_emits_decoded_log() {
        let logs = CapturedLogs::default();
        let _guard = capture_debug_logs(&logs);
        let record = ExecutionRecord::error("Unhandled", "{}")
            .with_log_result(general_purpose::STANDARD.encode(LOG_TAIL));

        let err = debugging_invoker(record)
            .invoke("HelloWorld", "{}", None, None)
            .await
            .unwrap_err();

        assert!(err.is_function_error());
        let output = logs.contents();
        assert!(output.contains("Remote invoke failed:"), "logs: {output}");
        assert!(output.contains("ValueError: boom"), "logs: {output}");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_log_not_emitted_when_not_debugging() {
        let logs = CapturedLogs::default();
        let _guard = capture_debug_logs(&logs);
        let record = ExecutionRecord::error("Unhandled", "{}")
            .with_log_result(general_purpose::STANDARD.encode(LOG_TAIL));

        invoker(Some(record)).invoke("HelloWorld", "{}", None, None).await.unwrap_err();

        assert!(!logs.contents().contains("ValueError: boom"));
    }

    #[tokio::test]
    async fn test_log_ignored_when_not_debugging() {
        let record = ExecutionRecord::error("Unhandled", "{}")
            .with_log_result(general_purpose::STANDARD.encode(LOG_TAIL));

        let err = invoker(Some(record)).invoke("HelloWorld", "{}", None, None).await.unwrap_err();

        assert!(matches!(err, InvokeError::Function { log_result: None, .. }));
    }

    #[tokio::test]
    async fn test_malformed_log_does_not_mask_error() {
        let record = ExecutionRecord::error("Unhandled", "{}").with_log_result("not base64!!");

        let err = debugging_invoker(record)
            .invoke("HelloWorld", "{}", None, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InvokeError::Function { ref message, log_result: None, .. } if message == "Unhandled"
        ));
    }
}
