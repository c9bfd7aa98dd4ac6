//! URL hygiene check
//!
//! Hybrid hygiene verdict for an announcement link: syntax gate, an
//! official-ish domain list, a domain reputation probe that can escalate to
//! `risky`, and a best-effort scan submission. Reputation and scan are both
//! key-gated; without credentials the check still returns a verdict from
//! the offline steps.

use async_trait::async_trait;
use tracing::{debug, warn};

use claimlens_core::{HygieneReport, HygieneVerdict, Signal, SignalPayload};
use claimlens_net::{url_domain, DomainReputationClient, RemoteError, UrlScanClient};

use crate::traits::{Check, CheckError, ClaimInput};

const OFFICIALISH_DOMAINS: &[&str] = &["sebi", "nseindia", "bseindia", "gleif", "fda.gov", "cdsco"];

/// Checks the hygiene of an announcement link
pub struct UrlHygieneCheck {
    reputation: Option<DomainReputationClient>,
    scanner: Option<UrlScanClient>,
}

impl UrlHygieneCheck {
    pub fn new(
        reputation: Option<DomainReputationClient>,
        scanner: Option<UrlScanClient>,
    ) -> Self {
        Self {
            reputation,
            scanner,
        }
    }

    /// Offline-only hygiene: syntax gate plus the domain list
    pub fn offline() -> Self {
        Self::new(None, None)
    }

    pub async fn check(&self, url: &str) -> HygieneReport {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return HygieneReport {
                verdict: HygieneVerdict::Invalid,
                reasons: vec!["Not a valid http(s) URL".to_string()],
                references: Vec::new(),
            };
        }

        let mut report = HygieneReport {
            verdict: HygieneVerdict::Caution,
            reasons: Vec::new(),
            references: vec![url.to_string()],
        };

        let domain = url_domain(url);
        if OFFICIALISH_DOMAINS.iter().any(|d| domain.contains(d)) {
            report.verdict = HygieneVerdict::LikelyOfficial;
            report.reasons.push(format!("Domain looks official: {}", domain));
        }

        if let Some(reputation) = &self.reputation {
            if !domain.is_empty() {
                match reputation.report(&domain).await {
                    Ok(rep) if rep.is_flagged() => {
                        report.verdict = HygieneVerdict::Risky;
                        report
                            .reasons
                            .push("Domain reputation flagged malicious".to_string());
                    }
                    Ok(_) => {
                        debug!(%domain, "domain reputation clean");
                    }
                    Err(RemoteError::MissingCredentials(_)) => {}
                    Err(e) => {
                        warn!(%domain, error = %e, "reputation lookup failed");
                    }
                }
            }
        }

        if let Some(scanner) = &self.scanner {
            match scanner.submit(url).await {
                Ok(receipt) => {
                    report.reasons.push("URL was scanned".to_string());
                    if let Some(result_url) = receipt.result_url {
                        report.references.push(result_url);
                    }
                }
                Err(RemoteError::MissingCredentials(_)) => {}
                Err(e) => {
                    warn!(%url, error = %e, "scan submission failed");
                    report.reasons.push("URL scan not available".to_string());
                }
            }
        }

        report
    }
}

#[async_trait]
impl Check for UrlHygieneCheck {
    fn name(&self) -> &str {
        "url_hygiene"
    }

    async fn run(&self, input: &ClaimInput) -> Result<Signal, CheckError> {
        let url = input
            .url
            .as_deref()
            .ok_or_else(|| CheckError::InvalidInput("no URL to check".to_string()))?;
        let report = self.check(url).await;
        Ok(Signal::new(SignalPayload::UrlHygiene(report)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_non_http_url_is_invalid() {
        let check = UrlHygieneCheck::offline();
        let report = check.check("ftp://example.com/doc.pdf").await;
        assert_eq!(report.verdict, HygieneVerdict::Invalid);
        assert!(report.references.is_empty());
    }

    #[tokio::test]
    async fn test_official_domain_is_likely_official() {
        let check = UrlHygieneCheck::offline();
        let report = check
            .check("https://www.sebi.gov.in/media/press-releases")
            .await;
        assert_eq!(report.verdict, HygieneVerdict::LikelyOfficial);
        assert!(report.reasons[0].contains("www.sebi.gov.in"));
    }

    #[tokio::test]
    async fn test_unknown_domain_defaults_to_caution() {
        let check = UrlHygieneCheck::offline();
        let report = check.check("https://totally-legit-tips.example/offer").await;
        assert_eq!(report.verdict, HygieneVerdict::Caution);
        assert_eq!(report.references, vec!["https://totally-legit-tips.example/offer"]);
    }

    #[tokio::test]
    async fn test_missing_url_input_is_rejected() {
        let check = UrlHygieneCheck::offline();
        let input = ClaimInput::from_text("some claim");
        let err = check.run(&input).await.unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
    }
}
