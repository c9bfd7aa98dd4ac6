//! ClaimLens networking layer
//!
//! Remote collaborators consumed by the checks: LEI registry resolution,
//! domain reputation, official-source probing, price feeds, the evidence
//! store and the explanation backend. Every call returns a value or a typed
//! failure; a slow or failing collaborator degrades to an error signal and
//! never blocks the rest of an analysis.

pub mod explain;
pub mod extract;
pub mod gleif;
pub mod official;
pub mod prices;
pub mod reputation;
pub mod store;

pub use explain::*;
pub use extract::*;
pub use gleif::*;
pub use official::*;
pub use prices::*;
pub use reputation::*;
pub use store::*;

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// HTTP client configuration shared by the remote collaborators
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: format!("claimlens/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Typed failure of a remote collaborator.
///
/// Call sites pattern-match both arms of the result explicitly; there is no
/// exception suppression anywhere in the pipeline.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("timed out after {0} seconds")]
    Timeout(u64),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RemoteError {
    /// Short machine-readable reason for evidence payloads
    pub fn reason(&self) -> String {
        match self {
            RemoteError::MissingCredentials(what) => format!("no_credentials_{}", what),
            RemoteError::Http(_) => "request_failed".to_string(),
            RemoteError::Status(code) => format!("status_{}", code),
            RemoteError::Decode(_) => "decode_failed".to_string(),
            RemoteError::Timeout(_) => "timeout".to_string(),
            RemoteError::InvalidInput(_) => "invalid_input".to_string(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout(0)
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Http(err.to_string())
        }
    }
}

/// Build the shared HTTP client
pub fn create_http_client(config: &NetConfig) -> Result<Client, RemoteError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| RemoteError::Http(e.to_string()))
}

/// Lower-cased host of a URL, or empty when unparsable
pub fn url_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetConfig::default();
        assert_eq!(config.timeout_secs, 20);
        assert!(config.user_agent.starts_with("claimlens/"));
    }

    #[test]
    fn test_url_domain() {
        assert_eq!(url_domain("https://www.sebi.gov.in/filings"), "www.sebi.gov.in");
        assert_eq!(url_domain("not a url"), "");
    }

    #[test]
    fn test_error_reasons() {
        assert_eq!(RemoteError::Status(503).reason(), "status_503");
        assert_eq!(
            RemoteError::MissingCredentials("reputation_api_key").reason(),
            "no_credentials_reputation_api_key"
        );
    }
}
