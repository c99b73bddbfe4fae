//! Lambda invocation routing for InvokeStack
//!
//! Decides whether a function is defined in the local project or only exists
//! in a remote account, and invokes it on the matching execution path.

pub mod client;
pub mod executor;
pub mod local;
pub mod remote;
pub mod router;

pub use client::{AwsClientFactory, ClientFactory};
pub use executor::{ExecutionRecord, LambdaInvokeExecutor, Payload, RemoteExecutor};
pub use local::{EmulatorInvoker, DEFAULT_EMULATOR_ENDPOINT};
pub use remote::{RemoteInvocationConfig, RemoteInvoker};
pub use router::{InvocationRouter, InvocationTarget};
