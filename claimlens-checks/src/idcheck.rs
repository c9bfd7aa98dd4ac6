//! Identifier extraction and registry validation
//!
//! Pattern validity is decided offline and is final: the optional live LEI
//! resolution can enrich the evidence with a resolved legal name but can
//! never flip `pattern_valid` in either direction.

use async_trait::async_trait;
use tracing::{debug, warn};

use claimlens_core::{
    extract_identifiers, validate_found, IdentifierBundle, IdentifierKind, Signal, SignalPayload,
};
use claimlens_net::{GleifClient, LeiRecord};

use crate::traits::{Check, CheckError, ClaimInput};

/// Extracts identifiers from claim text and validates their grammars
pub struct RegistryCheck {
    gleif: Option<GleifClient>,
}

impl RegistryCheck {
    pub fn new(gleif: Option<GleifClient>) -> Self {
        Self { gleif }
    }

    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Scan the text and grammar-check everything found
    pub fn bundle(&self, text: &str) -> IdentifierBundle {
        let text_found = extract_identifiers(text);
        let registry = validate_found(&text_found);
        IdentifierBundle {
            text_found,
            registry,
        }
    }

    /// Resolve grammar-valid LEIs against the live registry. Enrichment
    /// only; resolution failures leave the bundle untouched.
    pub async fn resolve_leis(&self, bundle: &IdentifierBundle) -> Vec<LeiRecord> {
        let Some(gleif) = &self.gleif else {
            return Vec::new();
        };
        let mut records = Vec::new();
        for check in &bundle.registry {
            if check.kind == IdentifierKind::Lei && check.pattern_valid {
                match gleif.resolve(&check.input).await {
                    Ok(record) => {
                        debug!(lei = %record.lei, name = %record.legal_name, "LEI resolved");
                        records.push(record);
                    }
                    Err(e) => {
                        warn!(lei = %check.input, error = %e, "LEI resolution failed");
                    }
                }
            }
        }
        records
    }
}

#[async_trait]
impl Check for RegistryCheck {
    fn name(&self) -> &str {
        "identifiers"
    }

    async fn run(&self, input: &ClaimInput) -> Result<Signal, CheckError> {
        let bundle = self.bundle(&input.text);
        Ok(Signal::new(SignalPayload::Identifier(bundle)))
    }
}
