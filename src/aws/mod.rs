//! AWS SDK plumbing: per-environment configuration and service clients

pub mod account;
pub mod error;
pub mod tagging;

pub use account::AccountId;
pub use error::FetchError;
pub use tagging::{Resource, TaggingClient};

use crate::credentials::CredentialBundle;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use std::sync::Arc;

/// Per-environment AWS configuration context.
///
/// Loads the SDK config once from an environment's static credentials and
/// hands out service clients built on it. Each environment of a run gets
/// its own context; nothing is shared between them.
#[derive(Clone)]
pub struct EnvContext {
    config: Arc<SdkConfig>,
    region: String,
}

impl EnvContext {
    /// Build SDK configuration from a credential bundle.
    ///
    /// The bundle's keys are installed as a static credentials provider, so
    /// ambient credentials (env vars, profiles, instance roles) are never
    /// consulted.
    pub async fn new(credentials: &CredentialBundle) -> Self {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            None,
            "tagsweep-credential-file",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .load()
            .await;

        Self {
            config: Arc::new(config),
            region: credentials.region.clone(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Create a Resource Groups Tagging API client from this context.
    pub fn tagging_client(&self) -> aws_sdk_resourcegroupstagging::Client {
        aws_sdk_resourcegroupstagging::Client::new(self.sdk_config())
    }

    /// Create an STS client from this context.
    pub fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for EnvContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::DEFAULT_REGION;

    fn test_bundle() -> CredentialBundle {
        CredentialBundle {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }

    #[tokio::test]
    async fn test_context_region() {
        let ctx = EnvContext::new(&test_bundle()).await;
        assert_eq!(ctx.region(), DEFAULT_REGION);
    }

    #[tokio::test]
    async fn test_context_clone_shares_config() {
        let ctx1 = EnvContext::new(&test_bundle()).await;
        let ctx2 = ctx1.clone();
        assert_eq!(ctx1.region(), ctx2.region());
    }

    #[tokio::test]
    async fn test_context_debug_omits_credentials() {
        let ctx = EnvContext::new(&test_bundle()).await;
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains(DEFAULT_REGION));
        assert!(!rendered.contains("secret"));
    }
}
