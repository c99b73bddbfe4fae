//! Provider client construction

use crate::executor::{LambdaInvokeExecutor, RemoteExecutor};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_lambda::config::{Credentials, Region};
use aws_sdk_lambda::Client;
use invokestack_core::InvokeError;

/// Builds a provider client for a region and credentials profile.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn build(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<Box<dyn RemoteExecutor>, InvokeError>;
}

/// Builds Lambda clients from the standard AWS configuration chain
#[derive(Debug, Clone, Default)]
pub struct AwsClientFactory {
    endpoint_url: Option<String>,
    credentials: Option<Credentials>,
}

impl AwsClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send requests to this endpoint instead of the regional one
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Use fixed credentials instead of resolving them from the profile chain
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

#[async_trait]
impl ClientFactory for AwsClientFactory {
    async fn build(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<Box<dyn RemoteExecutor>, InvokeError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }
        if let Some(credentials) = &self.credentials {
            loader = loader.credentials_provider(credentials.clone());
        }

        let sdk_config = loader.load().await;
        if sdk_config.region().is_none() {
            return Err(InvokeError::Configuration(match profile {
                Some(profile) => format!("no region configured for profile '{profile}'"),
                None => "no region configured".to_string(),
            }));
        }

        Ok(Box::new(LambdaInvokeExecutor::new(Client::new(&sdk_config))))
    }
}
