//! Evidence cases
//!
//! An `EvidenceCase` is the immutable snapshot produced by one analysis:
//! the input, every collected signal, the score breakdown, the explanation
//! and a content hash. A new case supersedes a prior one; nothing mutates
//! in place.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    BreakdownRow, ContradictionReading, FilingAnomalies, HygieneReport, IdentifierBundle,
    LookupResult, OfficialVerdict, ScoreBreakdown, SignalSet, SocialReading,
};

/// Maximum stored length of the claim text snippet
pub const SNIPPET_MAX_CHARS: usize = 800;

/// One completed analysis, in the exported evidence shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceCase {
    /// Per-analysis id; excluded from the content hash
    pub case_id: Uuid,
    /// Unix epoch seconds of case creation
    pub ts: i64,
    /// The analyzed claim text or URL
    pub query: Option<String>,
    pub lookup: Option<LookupResult>,
    pub url_hygiene: Option<HygieneReport>,
    pub official: Option<OfficialVerdict>,
    pub identifiers: IdentifierBundle,
    pub social: Option<SocialReading>,
    pub anomaly: Option<FilingAnomalies>,
    pub contra: Option<ContradictionReading>,
    /// Final clamped credibility score
    pub score: u8,
    pub breakdown: Vec<BreakdownRow>,
    /// First part of the combined claim text
    pub text_snippet: String,
    pub ai_explanation: String,
}

impl EvidenceCase {
    /// Assemble a case from the collected signals and the scoring result
    pub fn assemble(
        query: Option<String>,
        signals: SignalSet,
        breakdown: ScoreBreakdown,
        text: &str,
        ai_explanation: String,
    ) -> Self {
        Self {
            case_id: Uuid::new_v4(),
            ts: Utc::now().timestamp(),
            query,
            lookup: signals.lookup,
            url_hygiene: signals.url,
            official: signals.official,
            identifiers: signals.identifiers,
            social: signals.social,
            anomaly: signals.anomaly,
            contra: signals.contra,
            score: breakdown.total,
            breakdown: breakdown.rows,
            text_snippet: text.chars().take(SNIPPET_MAX_CHARS).collect(),
            ai_explanation,
        }
    }

    /// The canonical export object: every field except the per-analysis id.
    ///
    /// serde_json maps are key-sorted, so serializing this value is the
    /// canonical ordering the content hash is defined over.
    pub fn export_value(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("case_id");
        }
        value
    }

    /// Content-addressed hash: hex SHA-256 over the canonical serialization.
    /// Reproducible for identical field values.
    pub fn content_hash(&self) -> String {
        let canonical = self.export_value().to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Pretty JSON of the export object plus its hash, for download/save
    pub fn export_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert("hash".to_string(), self.content_hash().into());
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score_signals;

    fn sample_case(ts: i64) -> EvidenceCase {
        let signals = SignalSet {
            lookup: Some(LookupResult::miss("no entity match")),
            official: Some(OfficialVerdict::unverified("nothing matched")),
            text_len: 120,
            ..Default::default()
        };
        let breakdown = score_signals(&signals);
        let mut case = EvidenceCase::assemble(
            Some("https://example.com/announcement".to_string()),
            signals,
            breakdown,
            "Quarterly results were announced to the exchange this morning.",
            "Verdict: unverified.".to_string(),
        );
        case.ts = ts;
        case
    }

    #[test]
    fn test_hash_stable_for_identical_fields() {
        let a = sample_case(1_700_000_000);
        let b = sample_case(1_700_000_000);
        // different case_id, same content
        assert_ne!(a.case_id, b.case_id);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_hash_changes_with_content() {
        let a = sample_case(1_700_000_000);
        let b = sample_case(1_700_000_001);
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_export_shape() {
        let case = sample_case(1_700_000_000);
        let value = case.export_json();
        let obj = value.as_object().expect("object");
        for key in [
            "ts",
            "query",
            "lookup",
            "url_hygiene",
            "official",
            "identifiers",
            "social",
            "anomaly",
            "contra",
            "score",
            "breakdown",
            "text_snippet",
            "ai_explanation",
            "hash",
        ] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        let identifiers = obj["identifiers"].as_object().expect("identifiers object");
        assert!(identifiers.contains_key("text_found"));
        assert!(identifiers.contains_key("registry"));

        let rows = obj["breakdown"].as_array().expect("breakdown rows");
        let first = rows[0].as_object().expect("row object");
        assert!(first.contains_key("Dimension"));
        assert!(first.contains_key("Contribution"));
        assert!(first.contains_key("Why"));
    }

    #[test]
    fn test_snippet_truncated() {
        let long_text = "x".repeat(2000);
        let signals = SignalSet::default();
        let breakdown = score_signals(&signals);
        let case = EvidenceCase::assemble(None, signals, breakdown, &long_text, String::new());
        assert_eq!(case.text_snippet.chars().count(), SNIPPET_MAX_CHARS);
    }
}
