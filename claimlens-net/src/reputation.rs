//! Domain reputation and URL scan collaborators
//!
//! Both are key-gated: without credentials they return
//! `RemoteError::MissingCredentials` immediately, which the hygiene check
//! treats as an absent signal rather than a failure.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{create_http_client, NetConfig, RemoteError};

const REPUTATION_BASE_URL: &str = "https://www.virustotal.com/api/v3";
const URLSCAN_SUBMIT_URL: &str = "https://urlscan.io/api/v1/scan/";

/// Aggregated reputation verdicts for a domain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReputationReport {
    pub domain: String,
    pub malicious_count: u32,
    pub suspicious_count: u32,
    pub harmless_count: u32,
}

impl ReputationReport {
    pub fn is_flagged(&self) -> bool {
        self.malicious_count > 0
    }
}

#[derive(Debug, Deserialize)]
struct ReputationResponse {
    data: ReputationData,
}

#[derive(Debug, Deserialize)]
struct ReputationData {
    attributes: ReputationAttributes,
}

#[derive(Debug, Deserialize)]
struct ReputationAttributes {
    #[serde(rename = "last_analysis_stats", default)]
    stats: AnalysisStats,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisStats {
    #[serde(default)]
    malicious: u32,
    #[serde(default)]
    suspicious: u32,
    #[serde(default)]
    harmless: u32,
}

/// Domain reputation client (VirusTotal-style API)
pub struct DomainReputationClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl DomainReputationClient {
    pub fn new(config: &NetConfig, api_key: Option<String>) -> Result<Self, RemoteError> {
        Ok(Self {
            client: create_http_client(config)?,
            api_key,
            base_url: REPUTATION_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch the reputation report for one domain
    pub async fn report(&self, domain: &str) -> Result<ReputationReport, RemoteError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RemoteError::MissingCredentials("reputation_api_key"))?;
        if domain.is_empty() {
            return Err(RemoteError::InvalidInput("empty domain".to_string()));
        }

        let url = format!("{}/domains/{}", self.base_url, domain);
        debug!(%domain, "fetching domain reputation");

        let response = self
            .client
            .get(&url)
            .header("x-apikey", api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }

        let body: ReputationResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(ReputationReport {
            domain: domain.to_string(),
            malicious_count: body.data.attributes.stats.malicious,
            suspicious_count: body.data.attributes.stats.suspicious,
            harmless_count: body.data.attributes.stats.harmless,
        })
    }
}

/// Receipt of a URL scan submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReceipt {
    pub uuid: Option<String>,
    pub result_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

/// Best-effort URL scan submission client
pub struct UrlScanClient {
    client: Client,
    api_key: Option<String>,
    submit_url: String,
}

impl UrlScanClient {
    pub fn new(config: &NetConfig, api_key: Option<String>) -> Result<Self, RemoteError> {
        Ok(Self {
            client: create_http_client(config)?,
            api_key,
            submit_url: URLSCAN_SUBMIT_URL.to_string(),
        })
    }

    pub fn with_submit_url(mut self, url: &str) -> Self {
        self.submit_url = url.to_string();
        self
    }

    /// Submit a URL for scanning; returns the scan receipt
    pub async fn submit(&self, url: &str) -> Result<ScanReceipt, RemoteError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RemoteError::MissingCredentials("urlscan_api_key"))?;

        let payload = serde_json::json!({ "url": url, "visibility": "unlisted" });
        debug!(%url, "submitting URL scan");

        let response = self
            .client
            .post(&self.submit_url)
            .header("API-Key", api_key)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !(status.is_success() || status.as_u16() == 201) {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body: ScanResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(ScanReceipt {
            uuid: body.uuid,
            result_url: body.result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_degrades_without_network() {
        let client =
            DomainReputationClient::new(&NetConfig::default(), None).expect("client");
        let err = client.report("example.com").await.unwrap_err();
        assert!(matches!(err, RemoteError::MissingCredentials(_)));

        let scan = UrlScanClient::new(&NetConfig::default(), None).expect("client");
        let err = scan.submit("https://example.com").await.unwrap_err();
        assert!(matches!(err, RemoteError::MissingCredentials(_)));
    }

    #[test]
    fn test_report_flagging() {
        let report = ReputationReport {
            domain: "bad.example".to_string(),
            malicious_count: 3,
            ..Default::default()
        };
        assert!(report.is_flagged());
    }

    #[test]
    fn test_stats_parse_with_missing_fields() {
        let raw = serde_json::json!({
            "data": {"attributes": {"last_analysis_stats": {"malicious": 2}}}
        });
        let parsed: ReputationResponse = serde_json::from_value(raw).expect("parse");
        assert_eq!(parsed.data.attributes.stats.malicious, 2);
        assert_eq!(parsed.data.attributes.stats.harmless, 0);
    }
}
