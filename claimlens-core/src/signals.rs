//! Evidence signals
//!
//! A signal is one independently computed piece of evidence about a claim.
//! Signals are produced by unrelated checks (registry lookup, URL hygiene,
//! identifier validation, ...), are immutable once created, and carry no
//! ownership relation to each other. The scorer consumes a [`SignalSet`],
//! the union of whatever signals an analysis managed to collect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ContradictionReading, FilingAnomalies, IdentifierCheck, FoundIdentifier, LookupResult,
    SocialReading,
};

/// The evidence dimension a signal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Registry,
    OfficialSource,
    UrlHygiene,
    Identifier,
    TextPresence,
    Social,
    Anomaly,
    Contradiction,
}

/// Verdict of the official-source verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficialVerdictKind {
    Verified,
    NeedsOfficialLink,
    Unverified,
}

impl OfficialVerdictKind {
    /// Ordering used when merging fragments: a stronger verdict wins
    pub fn strength(&self) -> u8 {
        match self {
            OfficialVerdictKind::Verified => 2,
            OfficialVerdictKind::NeedsOfficialLink => 1,
            OfficialVerdictKind::Unverified => 0,
        }
    }
}

/// Outcome of checking a claim against official sources.
///
/// The verdict is never blank: absence of any match still yields
/// `Unverified` with an explicit reason string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficialVerdict {
    pub verdict: OfficialVerdictKind,
    pub reasons: Vec<String>,
    pub references: Vec<String>,
    /// Which resolution steps were consulted (registry, probe, keyword map)
    pub lookups: Vec<String>,
}

impl OfficialVerdict {
    pub fn unverified(reason: &str) -> Self {
        Self {
            verdict: OfficialVerdictKind::Unverified,
            reasons: vec![reason.to_string()],
            references: Vec::new(),
            lookups: Vec::new(),
        }
    }
}

/// URL hygiene verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HygieneVerdict {
    LikelyOfficial,
    Risky,
    Caution,
    Invalid,
}

/// Result of the URL hygiene check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HygieneReport {
    pub verdict: HygieneVerdict,
    pub reasons: Vec<String>,
    pub references: Vec<String>,
}

/// Identifiers found in text plus their pattern-validation results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifierBundle {
    /// Raw identifiers discovered in the claim text
    pub text_found: Vec<FoundIdentifier>,
    /// Pattern-validation outcome per identifier
    pub registry: Vec<IdentifierCheck>,
}

impl IdentifierBundle {
    /// True when at least one identifier passes its grammar
    pub fn any_valid(&self) -> bool {
        self.registry.iter().any(|c| c.pattern_valid)
    }
}

/// Kind-specific signal payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalPayload {
    /// Curated local registry lookup
    Registry(LookupResult),

    /// Official-source verification outcome
    OfficialSource(OfficialVerdict),

    /// URL hygiene check outcome
    UrlHygiene(HygieneReport),

    /// Identifier extraction + grammar validation
    Identifier(IdentifierBundle),

    /// How much usable text the analysis recovered
    TextPresence { chars: usize },

    /// Statistical legitimacy classification of the claim language
    Social(SocialReading),

    /// Numeric anomalies of a filing versus history
    Anomaly(FilingAnomalies),

    /// Price action contradicting the claimed sentiment
    Contradiction(ContradictionReading),
}

impl SignalPayload {
    pub fn kind(&self) -> SignalKind {
        match self {
            SignalPayload::Registry(_) => SignalKind::Registry,
            SignalPayload::OfficialSource(_) => SignalKind::OfficialSource,
            SignalPayload::UrlHygiene(_) => SignalKind::UrlHygiene,
            SignalPayload::Identifier(_) => SignalKind::Identifier,
            SignalPayload::TextPresence { .. } => SignalKind::TextPresence,
            SignalPayload::Social(_) => SignalKind::Social,
            SignalPayload::Anomaly(_) => SignalKind::Anomaly,
            SignalPayload::Contradiction(_) => SignalKind::Contradiction,
        }
    }
}

/// One independently computed piece of evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal instance ID
    pub id: Uuid,

    /// The kind-specific result
    pub payload: SignalPayload,

    /// Producer confidence (0.0 - 1.0), when the producer reports one
    pub confidence: Option<f64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(payload: SignalPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            confidence: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn kind(&self) -> SignalKind {
        self.payload.kind()
    }
}

/// The union of signals collected by one analysis.
///
/// Every field is independent and absent-tolerant; the scorer degrades
/// missing signals to neutral rows instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSet {
    pub lookup: Option<LookupResult>,
    pub official: Option<OfficialVerdict>,
    pub url: Option<HygieneReport>,
    pub identifiers: IdentifierBundle,
    pub text_len: usize,
    pub social: Option<SocialReading>,
    pub anomaly: Option<FilingAnomalies>,
    pub contra: Option<ContradictionReading>,
}

impl SignalSet {
    /// Fold one signal into the set; later signals of the same kind replace
    /// earlier ones (a new reading supersedes, never merges)
    pub fn absorb(&mut self, signal: Signal) {
        match signal.payload {
            SignalPayload::Registry(lookup) => self.lookup = Some(lookup),
            SignalPayload::OfficialSource(v) => self.official = Some(v),
            SignalPayload::UrlHygiene(h) => self.url = Some(h),
            SignalPayload::Identifier(b) => self.identifiers = b,
            SignalPayload::TextPresence { chars } => self.text_len = chars,
            SignalPayload::Social(s) => self.social = Some(s),
            SignalPayload::Anomaly(a) => self.anomaly = Some(a),
            SignalPayload::Contradiction(c) => self.contra = Some(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_kind_matches_payload() {
        let signal = Signal::new(SignalPayload::TextPresence { chars: 120 });
        assert_eq!(signal.kind(), SignalKind::TextPresence);
        assert!(signal.confidence.is_none());
    }

    #[test]
    fn test_confidence_clamped() {
        let signal = Signal::new(SignalPayload::TextPresence { chars: 0 }).with_confidence(1.7);
        assert_eq!(signal.confidence, Some(1.0));
    }

    #[test]
    fn test_absorb_replaces_same_kind() {
        let mut set = SignalSet::default();
        set.absorb(Signal::new(SignalPayload::TextPresence { chars: 10 }));
        set.absorb(Signal::new(SignalPayload::TextPresence { chars: 90 }));
        assert_eq!(set.text_len, 90);
    }

    #[test]
    fn test_verdict_strength_ordering() {
        assert!(
            OfficialVerdictKind::Verified.strength()
                > OfficialVerdictKind::NeedsOfficialLink.strength()
        );
        assert!(
            OfficialVerdictKind::NeedsOfficialLink.strength()
                > OfficialVerdictKind::Unverified.strength()
        );
    }
}
