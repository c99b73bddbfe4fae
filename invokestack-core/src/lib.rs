//! Core types and traits for InvokeStack
//!
//! This crate provides the pieces shared by every invocation path: the error
//! taxonomy, output sinks, debug session context, the function-definition
//! registry, and the [`Invoker`] trait.

pub mod debug;
pub mod error;
pub mod invoker;
pub mod registry;
pub mod sink;

pub use debug::{DebugContext, MAX_DEBUG_TIMEOUT};
pub use error::InvokeError;
pub use invoker::{Invoker, Sink};
pub use registry::{FunctionDefinition, FunctionProvider, FunctionRegistry};
pub use sink::{OutputSink, StreamWriter};
