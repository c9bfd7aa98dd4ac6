//! Official-source verification
//!
//! Three resolution steps, folded under the merge policy:
//! 1. curated registry lookup (offline, always runs),
//! 2. live probe of configured regulator/exchange pages,
//! 3. keyword-to-regulator suggestions when nothing stronger matched,
//!    downgrading to `needs_official_link`.
//!
//! The verdict is never blank: with no match anywhere the outcome is
//! `unverified` with an explicit reason.

use async_trait::async_trait;
use tracing::{debug, warn};

use claimlens_core::{
    CuratedRegistry, OfficialVerdict, OfficialVerdictKind, RegulatorMap, Signal, SignalPayload,
};
use claimlens_net::OfficialSourceProbe;

use crate::merge::merge_fragments;
use crate::traits::{Check, CheckError, ClaimInput};

/// Verifies a claim against official sources
pub struct OfficialVerifier {
    registry: CuratedRegistry,
    regulators: RegulatorMap,
    probe: Option<OfficialSourceProbe>,
}

impl OfficialVerifier {
    pub fn new(
        registry: CuratedRegistry,
        regulators: RegulatorMap,
        probe: Option<OfficialSourceProbe>,
    ) -> Self {
        Self {
            registry,
            regulators,
            probe,
        }
    }

    /// Built-in registry and regulator map, no live probe
    pub fn offline() -> Self {
        Self::new(CuratedRegistry::builtin(), RegulatorMap::builtin(), None)
    }

    /// Run the three resolution steps and merge their fragments
    pub async fn verify(&self, claim: &str, company_hint: &str) -> OfficialVerdict {
        let text = format!("{} {}", claim, company_hint);
        let mut fragments = Vec::new();

        // 1) curated registry
        let lookup = self.registry.lookup(&text);
        if lookup.found {
            let entity = lookup.entity.clone().unwrap_or_default();
            debug!(%entity, "registry matched entity");
            fragments.push(OfficialVerdict {
                verdict: OfficialVerdictKind::Unverified,
                reasons: vec![format!("Registry matched entity: {}", entity)],
                references: lookup.official_sites.clone(),
                lookups: vec![format!("registry={}", entity)],
            });
        }

        // 2) live probe
        if let Some(probe) = &self.probe {
            match probe.probe(claim, company_hint).await {
                Ok(Some(hit)) => {
                    fragments.push(OfficialVerdict {
                        verdict: OfficialVerdictKind::Verified,
                        reasons: vec![format!(
                            "Matched on {} ({})",
                            hit.source,
                            hit.matched_terms.join(", ")
                        )],
                        references: vec![hit.url],
                        lookups: vec![format!("probe={}", hit.source)],
                    });
                }
                Ok(None) => {
                    fragments.push(OfficialVerdict {
                        verdict: OfficialVerdictKind::Unverified,
                        reasons: vec!["No official announcement matched".to_string()],
                        references: Vec::new(),
                        lookups: vec!["probe".to_string()],
                    });
                }
                Err(e) => {
                    warn!(error = %e, "official probe failed");
                    fragments.push(OfficialVerdict {
                        verdict: OfficialVerdictKind::Unverified,
                        reasons: vec![format!("Official sources unreachable ({})", e.reason())],
                        references: Vec::new(),
                        lookups: vec!["probe".to_string()],
                    });
                }
            }
        }

        let mut merged = merge_fragments(fragments);

        // 3) regulator suggestions, only when nothing stronger matched
        if merged.verdict == OfficialVerdictKind::Unverified {
            let suggestions = self.regulators.suggest(&text);
            if !suggestions.is_empty() {
                let suggestion = OfficialVerdict {
                    verdict: OfficialVerdictKind::NeedsOfficialLink,
                    reasons: vec![
                        "No exact official match found; check suggested regulators based on domain keywords".to_string(),
                    ],
                    references: suggestions.iter().map(|s| s.url.clone()).collect(),
                    lookups: suggestions
                        .iter()
                        .map(|s| format!("keywords={} -> {}", s.sector, s.name))
                        .collect(),
                };
                let mut fragments = vec![merged, suggestion];
                merged = merge_fragments(std::mem::take(&mut fragments));
            }
        }

        merged
    }
}

#[async_trait]
impl Check for OfficialVerifier {
    fn name(&self) -> &str {
        "official"
    }

    async fn run(&self, input: &ClaimInput) -> Result<Signal, CheckError> {
        let verdict = self.verify(&input.text, &input.company_hint).await;
        Ok(Signal::new(SignalPayload::OfficialSource(verdict)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verdict_never_blank() {
        let verifier = OfficialVerifier::offline();
        let verdict = verifier.verify("xqzw llqr ppfm", "").await;
        assert_eq!(verdict.verdict, OfficialVerdictKind::Unverified);
        assert!(!verdict.reasons.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_route_downgrades_to_needs_official_link() {
        let verifier = OfficialVerifier::offline();
        let verdict = verifier
            .verify("drug approval announcement for new molecule", "")
            .await;
        assert_eq!(verdict.verdict, OfficialVerdictKind::NeedsOfficialLink);
        assert!(!verdict.references.is_empty());
        assert!(verdict.lookups.iter().any(|l| l.starts_with("keywords=")));
    }

    #[tokio::test]
    async fn test_registry_match_adds_official_sites() {
        let verifier = OfficialVerifier::offline();
        let verdict = verifier.verify("Novapharm announces expansion", "").await;
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r.contains("Registry matched entity")));
        assert!(verdict.lookups.iter().any(|l| l.starts_with("registry=")));
    }
}
