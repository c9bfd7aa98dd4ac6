//! Common check interface

use async_trait::async_trait;
use claimlens_core::Signal;
use claimlens_net::RemoteError;
use thiserror::Error;

/// Errors from check operations
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("remote collaborator failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("check not configured: {0}")]
    NotConfigured(String),
}

/// The claim material a check runs against
#[derive(Debug, Clone, Default)]
pub struct ClaimInput {
    /// Combined claim text (pasted text plus extracted document text)
    pub text: String,
    /// Company name hint, if the caller supplied one
    pub company_hint: String,
    /// Announcement link, if any
    pub url: Option<String>,
}

impl ClaimInput {
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

/// Common interface for signal-producing checks
#[async_trait]
pub trait Check: Send + Sync {
    /// Check name used in logs
    fn name(&self) -> &str;

    /// Run the check against the claim and emit one signal
    async fn run(&self, input: &ClaimInput) -> Result<Signal, CheckError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_converts() {
        let err: CheckError = RemoteError::Status(429).into();
        assert!(matches!(err, CheckError::Remote(RemoteError::Status(429))));
    }
}
