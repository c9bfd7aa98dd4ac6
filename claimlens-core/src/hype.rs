//! Lexical hype scoring for market tips
//!
//! A fixed list of hype markers (guarantees, multibagger talk, pump
//! language, numeric targets) drives a deterministic 0-100 score: 10 points
//! per distinct matching marker, capped at 100.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Hype marker patterns, matched case-insensitively against the tip text
static HYPE_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"sure shot",
        r"guaranteed",
        r"x\s*returns",
        r"multibagger",
        r"inside info",
        r"firm allotment",
        r"pre-ipo",
        r"pump",
        r"target\s*\d+",
        r"100%\s*returns?",
        r"assured",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("fixed hype pattern"))
    .collect()
});

/// Risk grade of a tip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// Lexical risk verdict for a tip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipVerdict {
    pub risk: RiskLevel,
    /// 0-100; floored at 70 when the verdict is high-risk
    pub score: u32,
    pub reasons: Vec<String>,
}

/// Score free text for hype language: 10 points per distinct marker, cap 100
pub fn hype_score(text: &str) -> u32 {
    let hits = HYPE_MARKERS.iter().filter(|re| re.is_match(text)).count() as u32;
    (hits * 10).min(100)
}

/// Grade a tip from its hype score and an externally supplied
/// technical-contradiction flag.
///
/// score >= 30 or a contradiction forces high risk with a floor of 70;
/// score >= 10 is medium; everything else is low.
pub fn tip_verdict(text: &str, ta_contradiction: bool) -> TipVerdict {
    let score = hype_score(text);
    if score >= 30 || ta_contradiction {
        return TipVerdict {
            risk: RiskLevel::High,
            score: score.max(70),
            reasons: vec!["Hype words or TA contradiction".to_string()],
        };
    }
    if score >= 10 {
        return TipVerdict {
            risk: RiskLevel::Medium,
            score,
            reasons: vec!["Some hype indicators".to_string()],
        };
    }
    TipVerdict {
        risk: RiskLevel::Low,
        score,
        reasons: vec!["No strong hype indicators".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hype_scenario_high_risk() {
        let text = "guaranteed multibagger target 500";
        assert!(hype_score(text) >= 30);
        let verdict = tip_verdict(text, false);
        assert_eq!(verdict.risk, RiskLevel::High);
        assert!(verdict.score >= 70);
    }

    #[test]
    fn test_distinct_markers_counted_once() {
        let text = "pump pump pump";
        assert_eq!(hype_score(text), 10);
    }

    #[test]
    fn test_clean_text_is_low() {
        let verdict = tip_verdict("Quarterly results were announced to the exchange.", false);
        assert_eq!(verdict.risk, RiskLevel::Low);
        assert_eq!(verdict.score, 0);
    }

    #[test]
    fn test_contradiction_forces_high() {
        let verdict = tip_verdict("Quarterly results were announced.", true);
        assert_eq!(verdict.risk, RiskLevel::High);
        assert_eq!(verdict.score, 70);
    }

    #[test]
    fn test_medium_band() {
        let verdict = tip_verdict("This stock is assured to do well", false);
        assert_eq!(verdict.risk, RiskLevel::Medium);
        assert_eq!(verdict.score, 10);
    }

    #[test]
    fn test_deterministic() {
        let text = "sure shot pre-IPO allotment, 10x returns";
        assert_eq!(hype_score(text), hype_score(text));
        assert_eq!(tip_verdict(text, false), tip_verdict(text, false));
    }

    #[test]
    fn test_score_capped() {
        let text = "sure shot guaranteed 10x returns multibagger inside info \
                    firm allotment pre-ipo pump target 500 100% returns assured";
        assert_eq!(hype_score(text), 100);
    }
}
