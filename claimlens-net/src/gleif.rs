//! LEI registry resolution
//!
//! Resolves a Legal Entity Identifier (or an entity legal name) against a
//! GLEIF-style registry API. Resolution is strictly optional: pattern
//! validity of an identifier is decided offline before this client is ever
//! consulted, and a failed lookup degrades to a typed error.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use claimlens_core::{validate, IdentifierKind};

use crate::{create_http_client, NetConfig, RemoteError};

const DEFAULT_BASE_URL: &str = "https://api.gleif.org/api/v1";

/// One resolved LEI record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeiRecord {
    pub lei: String,
    pub legal_name: String,
    pub status: Option<String>,
}

/// Client for the LEI registry
pub struct GleifClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LeiResponse {
    data: LeiData,
}

#[derive(Debug, Deserialize)]
struct LeiSearchResponse {
    #[serde(default)]
    data: Vec<LeiData>,
}

#[derive(Debug, Deserialize)]
struct LeiData {
    id: String,
    attributes: LeiAttributes,
}

#[derive(Debug, Deserialize)]
struct LeiAttributes {
    entity: LeiEntity,
    #[serde(default)]
    registration: Option<LeiRegistration>,
}

#[derive(Debug, Deserialize)]
struct LeiEntity {
    #[serde(rename = "legalName")]
    legal_name: LeiLegalName,
}

#[derive(Debug, Deserialize)]
struct LeiLegalName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LeiRegistration {
    #[serde(default)]
    status: Option<String>,
}

impl From<LeiData> for LeiRecord {
    fn from(data: LeiData) -> Self {
        LeiRecord {
            lei: data.id,
            legal_name: data.attributes.entity.legal_name.name,
            status: data.attributes.registration.and_then(|r| r.status),
        }
    }
}

impl GleifClient {
    pub fn new(config: &NetConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            client: create_http_client(config)?,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different registry endpoint (tests, mirrors)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Resolve by LEI code when the input matches the LEI grammar, else by
    /// legal-name search. Returns the best matching record.
    pub async fn resolve(&self, lei_or_name: &str) -> Result<LeiRecord, RemoteError> {
        if validate(lei_or_name, IdentifierKind::Lei).pattern_valid {
            self.by_code(lei_or_name).await
        } else {
            self.by_name(lei_or_name).await
        }
    }

    async fn by_code(&self, lei: &str) -> Result<LeiRecord, RemoteError> {
        let url = format!("{}/lei-records/{}", self.base_url, lei.trim().to_uppercase());
        debug!(%url, "resolving LEI record");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        let body: LeiResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(body.data.into())
    }

    async fn by_name(&self, name: &str) -> Result<LeiRecord, RemoteError> {
        if name.trim().is_empty() {
            return Err(RemoteError::InvalidInput("empty entity name".to_string()));
        }
        let url = format!(
            "{}/lei-records?filter[entity.legalName]={}&page[size]=5",
            self.base_url,
            urlencoding::encode(name.trim())
        );
        debug!(%url, "searching LEI records by legal name");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        let body: LeiSearchResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        body.data
            .into_iter()
            .next()
            .map(LeiRecord::from)
            .ok_or_else(|| RemoteError::Decode("no matching LEI record".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_name_rejected_before_network() {
        let client = GleifClient::new(&NetConfig::default()).expect("client");
        let err = client.by_name("  ").await.unwrap_err();
        assert!(matches!(err, RemoteError::InvalidInput(_)));
    }

    #[test]
    fn test_record_from_response_shape() {
        let raw = serde_json::json!({
            "data": {
                "id": "LIPSUM1234567890ABCD",
                "attributes": {
                    "entity": {"legalName": {"name": "Lipsum Holdings"}},
                    "registration": {"status": "ISSUED"}
                }
            }
        });
        let parsed: LeiResponse = serde_json::from_value(raw).expect("parse");
        let record: LeiRecord = parsed.data.into();
        assert_eq!(record.legal_name, "Lipsum Holdings");
        assert_eq!(record.status.as_deref(), Some("ISSUED"));
    }
}
