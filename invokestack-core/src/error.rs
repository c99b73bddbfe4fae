//! Invocation error types

use bytes::Bytes;
use thiserror::Error;

/// Failure of a single invocation.
///
/// Transport-class failures (the invocation mechanism broke) are kept apart
/// from [`InvokeError::Function`] (the function ran and reported an error) so
/// callers can tell them apart without inspecting message text.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Failed to configure client: {0}")]
    Configuration(String),

    #[error("Remote invoke failed to execute: {0}")]
    Transport(String),

    #[error("Remote invoke failed to execute. Executor did not return any response")]
    EmptyResponse,

    #[error("Function error: {message}")]
    Function {
        /// Error indicator reported by the runtime (`Handled`, `Unhandled`, ...)
        message: String,
        /// Raw response payload, usually a structured error description
        payload: Bytes,
        /// Decoded runtime log tail, only captured during a debug session
        log_result: Option<Bytes>,
    },

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Local invoke failed: {0}")]
    Local(String),
}

impl InvokeError {
    /// True when the invocation mechanism itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Transport(_) | Self::EmptyResponse
        )
    }

    /// True when the invoked function reported an error.
    pub fn is_function_error(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    pub fn function_error(message: impl Into<String>, payload: Bytes) -> Self {
        Self::Function {
            message: message.into(),
            payload,
            log_result: None,
        }
    }

    /// Attach decoded log data to a function error. Other variants are returned unchanged.
    pub fn with_log_result(self, log: Bytes) -> Self {
        match self {
            Self::Function {
                message, payload, ..
            } => Self::Function {
                message,
                payload,
                log_result: Some(log),
            },
            other => other,
        }
    }
}
