//! InvokeStack - invoke Lambda functions locally or remotely
//!
//! Functions defined in the project configuration are invoked on a local
//! Lambda emulator. Anything else is invoked in the configured AWS account.

mod config;

use anyhow::Context;
use clap::Parser;
use invokestack_core::{
    DebugContext, FunctionProvider, Invoker, Sink, StreamWriter, MAX_DEBUG_TIMEOUT,
};
use invokestack_lambda::{EmulatorInvoker, InvocationRouter, RemoteInvocationConfig, RemoteInvoker};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "invokestack")]
#[command(about = "Invoke a Lambda function locally or in your AWS account", long_about = None)]
struct Args {
    /// Logical ID, function name or full path of the function
    function_identifier: String,

    /// Event JSON passed to the function
    #[arg(short, long, conflicts_with = "event_file")]
    event: Option<String>,

    /// File containing the event JSON
    #[arg(long)]
    event_file: Option<PathBuf>,

    /// Project configuration file
    #[arg(short, long, env = "INVOKESTACK_CONFIG")]
    config: Option<PathBuf>,

    /// AWS credentials profile for remote invocations
    #[arg(long)]
    profile: Option<String>,

    /// AWS region for remote invocations
    #[arg(long)]
    region: Option<String>,

    /// Local Lambda emulator endpoint
    #[arg(long, env = "INVOKESTACK_EMULATOR_ENDPOINT")]
    emulator_endpoint: Option<String>,

    /// Port a debugger attaches on (repeatable)
    #[arg(short = 'd', long = "debug-port")]
    debug_ports: Vec<u16>,

    /// Extra arguments for the debugged runtime
    #[arg(long)]
    debug_args: Option<String>,

    /// Path to debugger files
    #[arg(long)]
    debugger_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "INVOKESTACK_LOG_LEVEL")]
    log_level: String,
}

impl Args {
    fn event(&self) -> anyhow::Result<String> {
        match (&self.event, &self.event_file) {
            (Some(event), _) => Ok(event.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file {}", path.display())),
            (None, None) => Ok("{}".to_string()),
        }
    }

    fn debug_context(&self) -> Option<DebugContext> {
        if self.debug_ports.is_empty() {
            return None;
        }

        let mut context = DebugContext::new(self.debug_ports.clone());
        if let Some(args) = &self.debug_args {
            context = context.with_args(args.clone());
        }
        if let Some(path) = &self.debugger_path {
            context = context.with_debugger_path(path.clone());
        }
        context.debug_function = Some(self.function_identifier.clone());
        Some(context)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the function's output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "invokestack={level},invokestack_lambda={level},invokestack_core={level}",
                    level = args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::load(args.config.as_deref())?;
    let event = args.event()?;
    let debug_context = args.debug_context();

    let registry: Arc<dyn FunctionProvider> = Arc::new(config.registry());
    let endpoint = args
        .emulator_endpoint
        .clone()
        .unwrap_or_else(|| config.local.endpoint.clone());

    let remote_config = RemoteInvocationConfig {
        profile: args.profile.clone().or(config.remote.profile),
        region: args.region.clone().or(config.remote.region),
        debug_context: debug_context.clone(),
    };

    let router = InvocationRouter::new(
        registry.clone(),
        Arc::new(EmulatorInvoker::new(registry, endpoint, debug_context.clone())),
        Arc::new(RemoteInvoker::new(remote_config)),
    );

    info!(function = %args.function_identifier, "Invoking function");

    let mut stdout = StreamWriter::new(std::io::stdout());
    let mut stderr = StreamWriter::new(std::io::stderr());
    let stdout_sink: Sink<'_> = Some(&mut stdout);
    let stderr_sink: Sink<'_> = Some(&mut stderr);

    let invocation = router.invoke(&args.function_identifier, &event, stdout_sink, stderr_sink);

    if debug_context.is_some() {
        tokio::time::timeout(MAX_DEBUG_TIMEOUT, invocation)
            .await
            .with_context(|| {
                format!(
                    "Debug session exceeded {} seconds",
                    MAX_DEBUG_TIMEOUT.as_secs()
                )
            })??;
    } else {
        invocation.await?;
    }

    Ok(())
}
