//! Weighted credibility scorer
//!
//! Turns the collected signals into a 0-100 credibility score with an
//! itemized breakdown. Positive contributions mean more credible, negative
//! mean risky. Every signal that was collected produces a row, including
//! zero-valued ones: the breakdown is the audit trail, not an optimization.

use serde::{Deserialize, Serialize};

use crate::{
    HygieneVerdict, OfficialVerdictKind, SignalSet, SocialLabel, MAX_SCORE, MIN_SCORE,
    MIN_USEFUL_TEXT_LEN,
};

/// One named, signed contribution with its justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    #[serde(rename = "Dimension")]
    pub dimension: String,
    #[serde(rename = "Contribution")]
    pub contribution: i32,
    #[serde(rename = "Why")]
    pub why: String,
}

impl BreakdownRow {
    fn new(dimension: &str, contribution: i32, why: String) -> Self {
        Self {
            dimension: dimension.to_string(),
            contribution,
            why,
        }
    }
}

/// The full scoring result: ordered rows plus the clamped total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rows: Vec<BreakdownRow>,
    /// clamp(sum of contributions, 0, 100); the unclamped sum is never the
    /// final score
    pub total: u8,
}

impl ScoreBreakdown {
    /// Sum of all row contributions before clamping (exposed for audit)
    pub fn unclamped_sum(&self) -> i32 {
        self.rows.iter().map(|r| r.contribution).sum()
    }

    /// Justifications ordered by contribution, strongest first
    pub fn top_reasons(&self, limit: usize) -> Vec<String> {
        let mut rows: Vec<&BreakdownRow> = self.rows.iter().collect();
        rows.sort_by_key(|r| -r.contribution);
        rows.into_iter().take(limit).map(|r| r.why.clone()).collect()
    }
}

/// Score a set of signals with the deterministic weighted model.
///
/// Rows are accumulated in a fixed evaluated order; absent optional signals
/// contribute no row, present ones always do.
pub fn score_signals(signals: &SignalSet) -> ScoreBreakdown {
    let mut rows = Vec::new();

    // Neutral starting point
    rows.push(BreakdownRow::new("Baseline", 50, "Neutral baseline".to_string()));

    // Curated registry
    match &signals.lookup {
        Some(lookup) if lookup.found => {
            let entity = lookup.entity.as_deref().unwrap_or("entity");
            rows.push(BreakdownRow::new(
                "Local Registry Match",
                20,
                format!("{} found in curated registry", entity),
            ));
        }
        _ => rows.push(BreakdownRow::new(
            "Local Registry Match",
            0,
            "No curated match".to_string(),
        )),
    }

    // Official-source verification
    match signals.official.as_ref().map(|o| o.verdict) {
        Some(OfficialVerdictKind::Verified) => rows.push(BreakdownRow::new(
            "Official Filing Match",
            30,
            "Matched regulator/exchange source".to_string(),
        )),
        Some(OfficialVerdictKind::NeedsOfficialLink) => rows.push(BreakdownRow::new(
            "Regulator Suggested",
            5,
            "No exact match but regulators suggested".to_string(),
        )),
        _ => rows.push(BreakdownRow::new(
            "Official Filing Match",
            -5,
            "Not found in official sources (light check)".to_string(),
        )),
    }

    // URL hygiene (row only when a URL was actually checked)
    if let Some(url) = &signals.url {
        match url.verdict {
            HygieneVerdict::LikelyOfficial => rows.push(BreakdownRow::new(
                "URL Domain Official-ish",
                10,
                "Domain looks official (regulator/exchange/registry)".to_string(),
            )),
            HygieneVerdict::Risky => rows.push(BreakdownRow::new(
                "URL Risk",
                -40,
                "Malicious indicators on domain".to_string(),
            )),
            HygieneVerdict::Caution | HygieneVerdict::Invalid => rows.push(BreakdownRow::new(
                "URL Scan Presence",
                2,
                "URL was scanned / reachable".to_string(),
            )),
        }
    }

    // Identifier grammar validation
    if signals.identifiers.any_valid() {
        let valid: Vec<&str> = signals
            .identifiers
            .registry
            .iter()
            .filter(|c| c.pattern_valid)
            .map(|c| c.kind.label())
            .collect();
        rows.push(BreakdownRow::new(
            "Identifiers Valid",
            10,
            format!("Valid pattern(s): {}", valid.join(", ")),
        ));
    }

    // Extracted text presence
    if signals.text_len > MIN_USEFUL_TEXT_LEN {
        rows.push(BreakdownRow::new(
            "Text Extracted",
            5,
            "Text extracted successfully".to_string(),
        ));
    } else {
        rows.push(BreakdownRow::new(
            "Text Extracted",
            -3,
            "No/low extractable text".to_string(),
        ));
    }

    // Social/legitimacy classification
    if let Some(social) = &signals.social {
        match social.label {
            SocialLabel::Legit => rows.push(BreakdownRow::new(
                "Social Signal",
                5,
                format!("Classified as legit (p={:.2})", social.score),
            )),
            SocialLabel::Suspicious => rows.push(BreakdownRow::new(
                "Social Signal",
                -5,
                format!("Classified as suspicious (p={:.2})", social.score),
            )),
        }
    }

    // Numeric anomalies
    if let Some(anomaly) = &signals.anomaly {
        if anomaly.any() {
            rows.push(BreakdownRow::new(
                "Numeric Anomaly",
                -12,
                format!("Outlier vs history: {}", anomaly.flagged().join(", ")),
            ));
        } else {
            rows.push(BreakdownRow::new(
                "Numeric Anomaly",
                0,
                "Figures within historical range".to_string(),
            ));
        }
    }

    // Market contradiction
    if let Some(contra) = &signals.contra {
        if contra.contradiction_score >= 2 {
            rows.push(BreakdownRow::new(
                "Market Contradiction",
                -8,
                "Price/RSI contradicts the claimed sentiment".to_string(),
            ));
        } else {
            rows.push(BreakdownRow::new(
                "Market Contradiction",
                0,
                "No material price contradiction".to_string(),
            ));
        }
    }

    let sum: i32 = rows.iter().map(|r| r.contribution).sum();
    ScoreBreakdown {
        rows,
        total: sum.clamp(MIN_SCORE, MAX_SCORE) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ContradictionReading, FilingAnomalies, AnomalyReading, HygieneReport, IdentifierBundle,
        IdentifierKind, LookupResult, OfficialVerdict, SocialReading, validate,
    };

    fn bare_signals() -> SignalSet {
        SignalSet {
            lookup: Some(LookupResult::miss("no entity match")),
            official: Some(OfficialVerdict::unverified("no official record matched")),
            ..Default::default()
        }
    }

    #[test]
    fn test_bare_scenario_scores_42() {
        // baseline 50 + registry 0 - official 5 - text 3 = 42
        let breakdown = score_signals(&bare_signals());
        assert_eq!(breakdown.total, 42);
        assert_eq!(breakdown.unclamped_sum(), 42);
    }

    #[test]
    fn test_total_always_in_bounds_and_equals_clamped_sum() {
        // Stack every penalty: sum goes negative, total clamps to 0
        let mut signals = bare_signals();
        signals.url = Some(HygieneReport {
            verdict: crate::HygieneVerdict::Risky,
            reasons: vec![],
            references: vec![],
        });
        signals.social = Some(SocialReading {
            score: 0.1,
            label: crate::SocialLabel::Suspicious,
        });
        let mut fields = std::collections::BTreeMap::new();
        fields.insert(
            "revenue".to_string(),
            AnomalyReading {
                latest: Some(150.0),
                mean: Some(100.0),
                deviation: Some(0.5),
                anomaly: true,
            },
        );
        signals.anomaly = Some(FilingAnomalies { fields });
        signals.contra = Some(ContradictionReading {
            ma20: 110.0,
            rsi: 80.0,
            contradiction_score: 2,
        });

        let breakdown = score_signals(&signals);
        assert!(breakdown.unclamped_sum() < 0);
        assert_eq!(breakdown.total, 0);
        assert_eq!(
            breakdown.total as i32,
            breakdown.unclamped_sum().clamp(0, 100)
        );
    }

    #[test]
    fn test_high_credibility_path() {
        let mut signals = bare_signals();
        signals.lookup = Some(LookupResult {
            found: true,
            entity: Some("Novapharm Labs".to_string()),
            ..Default::default()
        });
        signals.official = Some(OfficialVerdict {
            verdict: crate::OfficialVerdictKind::Verified,
            reasons: vec![],
            references: vec![],
            lookups: vec![],
        });
        signals.url = Some(HygieneReport {
            verdict: crate::HygieneVerdict::LikelyOfficial,
            reasons: vec![],
            references: vec![],
        });
        signals.identifiers = IdentifierBundle {
            text_found: vec![],
            registry: vec![validate("LIPSUM1234567890ABCD", IdentifierKind::Lei)],
        };
        signals.text_len = 500;

        // 50 + 20 + 30 + 10 + 10 + 5 = 125, clamps to 100
        let breakdown = score_signals(&signals);
        assert_eq!(breakdown.unclamped_sum(), 125);
        assert_eq!(breakdown.total, 100);
    }

    #[test]
    fn test_idempotent() {
        let signals = bare_signals();
        let a = score_signals(&signals);
        let b = score_signals(&signals);
        assert_eq!(a, b);
    }

    #[test]
    fn test_present_but_quiet_signals_still_emit_rows() {
        let mut signals = bare_signals();
        signals.anomaly = Some(FilingAnomalies::default());
        signals.contra = Some(ContradictionReading::neutral());

        let breakdown = score_signals(&signals);
        assert!(breakdown
            .rows
            .iter()
            .any(|r| r.dimension == "Numeric Anomaly" && r.contribution == 0));
        assert!(breakdown
            .rows
            .iter()
            .any(|r| r.dimension == "Market Contradiction" && r.contribution == 0));
        // zero rows do not move the total
        assert_eq!(breakdown.total, 42);
    }

    #[test]
    fn test_regulator_suggestion_path() {
        let mut signals = bare_signals();
        signals.official = Some(OfficialVerdict {
            verdict: crate::OfficialVerdictKind::NeedsOfficialLink,
            reasons: vec!["check suggested regulators".to_string()],
            references: vec!["https://www.fda.gov/".to_string()],
            lookups: vec![],
        });
        let breakdown = score_signals(&signals);
        // 50 + 0 + 5 - 3 = 52
        assert_eq!(breakdown.total, 52);
        assert!(breakdown.rows.iter().any(|r| r.dimension == "Regulator Suggested"));
    }

    #[test]
    fn test_top_reasons_ordering() {
        let breakdown = score_signals(&bare_signals());
        let reasons = breakdown.top_reasons(2);
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[0], "Neutral baseline");
    }
}
