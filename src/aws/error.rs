//! Fetch error classification
//!
//! Typed errors for AWS SDK operations using the `.code()` method from
//! `ProvideErrorMetadata` instead of string matching on Debug format. A
//! `FetchError` is scoped to one environment: the orchestrator logs it and
//! moves on to the next environment.

use thiserror::Error;

/// Per-environment API failure categories
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credentials were rejected or have expired
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Rate limit exceeded and the SDK's own retries were exhausted
    #[error("Rate limit exceeded: {message}")]
    Throttled { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl FetchError {
    /// Check if this is an authentication failure
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::AuthenticationFailed { .. })
    }

    /// Check if this is a throttling failure
    pub fn is_throttled(&self) -> bool {
        matches!(self, FetchError::Throttled { .. })
    }
}

/// Known AWS error codes for rejected or expired credentials
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AuthFailure",
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> FetchError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if AUTH_CODES.contains(&c) => FetchError::AuthenticationFailed { message },
        Some(c) if THROTTLING_CODES.contains(&c) => FetchError::Throttled { message },
        _ => FetchError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_codes() {
        for code in AUTH_CODES {
            let err = classify_aws_error(Some(code), Some("denied"));
            assert!(
                err.is_auth_failure(),
                "Expected AuthenticationFailed for code: {code}"
            );
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("slow down"));
            assert!(err.is_throttled(), "Expected Throttled for code: {code}");
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, FetchError::Sdk { .. }));

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, FetchError::Sdk { code: None, .. }));
    }

    #[test]
    fn message_defaults_when_absent() {
        let err = classify_aws_error(Some("AuthFailure"), None);
        assert_eq!(err.to_string(), "Authentication failed: Unknown error");
    }
}
