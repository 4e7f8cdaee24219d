//! AWS account validation and identity

use super::error::{classify_aws_error, FetchError};
use super::EnvContext;
use aws_sdk_sts::error::ProvideErrorMetadata;
use std::fmt;

/// Strongly-typed AWS account ID (12-digit string)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// Get the account ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate an environment's credentials via STS GetCallerIdentity.
///
/// This operation requires no special permissions, so it cleanly separates
/// "the credentials are bad" from "the tagging API call failed" before any
/// paging starts.
pub async fn verify_identity(ctx: &EnvContext) -> Result<AccountId, FetchError> {
    let sts = ctx.sts_client();
    let identity = sts.get_caller_identity().send().await.map_err(|e| {
        let meta = ProvideErrorMetadata::meta(&e);
        classify_aws_error(meta.code(), meta.message())
    })?;

    let account = identity.account().ok_or_else(|| FetchError::Sdk {
        code: None,
        message: "No account ID returned from STS GetCallerIdentity".to_string(),
    })?;

    Ok(AccountId(account.to_string()))
}
