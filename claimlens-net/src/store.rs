//! Evidence store client
//!
//! A single best-effort write per completed analysis into an append-only
//! remote store. Failures are reported to the caller and never retried
//! automatically; a failed save can never corrupt a prior record because
//! records are only ever inserted.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use claimlens_core::EvidenceCase;

use crate::{create_http_client, NetConfig, RemoteError};

/// Evidence store connection settings
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Base REST endpoint, e.g. `https://xyz.supabase.co/rest/v1`
    pub base_url: Option<String>,
    /// Service key used for inserts
    pub api_key: Option<String>,
    /// Target table name
    pub table: String,
}

impl StoreConfig {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            base_url,
            api_key,
            table: "evidence_cases".to_string(),
        }
    }
}

/// Acknowledgement of a successful insert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub ok: bool,
    /// Content hash of the saved case
    pub hash: String,
}

/// Append-only evidence store client
pub struct EvidenceStoreClient {
    client: Client,
    config: StoreConfig,
}

impl EvidenceStoreClient {
    pub fn new(net: &NetConfig, config: StoreConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            client: create_http_client(net)?,
            config,
        })
    }

    /// Insert one evidence case. Exactly one attempt; the caller decides
    /// what a failure means.
    pub async fn save(&self, case: &EvidenceCase) -> Result<SaveReceipt, RemoteError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or(RemoteError::MissingCredentials("store_url"))?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(RemoteError::MissingCredentials("store_api_key"))?;

        let url = format!("{}/{}", base_url.trim_end_matches('/'), self.config.table);
        let payload = serde_json::json!({ "payload": case.export_json() });
        debug!(case_id = %case.case_id, "saving evidence case");

        let response = self
            .client
            .post(&url)
            .header("apikey", api_key)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Prefer", "return=minimal")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(case_id = %case.case_id, status = status.as_u16(), "evidence save rejected");
            return Err(RemoteError::Status(status.as_u16()));
        }

        Ok(SaveReceipt {
            ok: true,
            hash: case.content_hash(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimlens_core::{score_signals, SignalSet};

    #[tokio::test]
    async fn test_unconfigured_store_degrades_without_network() {
        let client = EvidenceStoreClient::new(
            &NetConfig::default(),
            StoreConfig::new(None, None),
        )
        .expect("client");

        let signals = SignalSet::default();
        let breakdown = score_signals(&signals);
        let case = EvidenceCase::assemble(None, signals, breakdown, "", String::new());

        let err = client.save(&case).await.unwrap_err();
        assert!(matches!(err, RemoteError::MissingCredentials(_)));
    }
}
