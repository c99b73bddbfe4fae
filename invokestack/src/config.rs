//! Configuration management

use invokestack_core::{FunctionDefinition, FunctionRegistry};
use invokestack_lambda::DEFAULT_EMULATOR_ENDPOINT;
use serde::Deserialize;
use std::path::Path;

/// Project configuration
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub local: LocalConfig,

    /// Functions defined in the project
    #[serde(default)]
    pub functions: Vec<FunctionDefinition>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RemoteConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_EMULATOR_ENDPOINT.to_string()
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Without an explicit path, `invokestack.toml` in the working directory is
    /// used when present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("invokestack").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("INVOKESTACK").separator("__"))
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }

    /// Registry of the project's functions. A missing logical ID falls back to the function name.
    pub fn registry(&self) -> FunctionRegistry {
        FunctionRegistry::from_definitions(self.functions.iter().cloned().map(|mut definition| {
            if definition.logical_id.is_empty() {
                definition.logical_id = definition.function_name.clone();
            }
            definition
        }))
    }
}
