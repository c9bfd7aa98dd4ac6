//! Merge policy for verification fragments
//!
//! The official verifier runs several resolution steps that each produce a
//! partial [`OfficialVerdict`]. Fragments are folded under an explicit
//! per-field policy instead of ad-hoc overwrites:
//!
//! | field        | policy                                      |
//! |--------------|---------------------------------------------|
//! | `verdict`    | override only by a strictly stronger verdict |
//! | `reasons`    | append, dedupe                              |
//! | `references` | append, dedupe                              |
//! | `lookups`    | append, dedupe                              |

use claimlens_core::{OfficialVerdict, OfficialVerdictKind};

/// Fold a fragment into the accumulated verdict under the merge policy
pub fn merge_fragment(acc: &mut OfficialVerdict, fragment: OfficialVerdict) {
    if fragment.verdict.strength() > acc.verdict.strength() {
        acc.verdict = fragment.verdict;
    }
    append_dedupe(&mut acc.reasons, fragment.reasons);
    append_dedupe(&mut acc.references, fragment.references);
    append_dedupe(&mut acc.lookups, fragment.lookups);
}

/// Fold all fragments, starting from an explicit `unverified` base so the
/// merged verdict is never blank
pub fn merge_fragments(fragments: Vec<OfficialVerdict>) -> OfficialVerdict {
    let mut acc = OfficialVerdict::unverified("no official record matched");
    let had_fragments = !fragments.is_empty();
    for fragment in fragments {
        merge_fragment(&mut acc, fragment);
    }
    // the seed reason only stands when nothing else said anything
    if had_fragments && acc.reasons.len() > 1 {
        acc.reasons.retain(|r| r != "no official record matched");
    }
    acc
}

fn append_dedupe(acc: &mut Vec<String>, extra: Vec<String>) {
    for item in extra {
        if !acc.contains(&item) {
            acc.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(verdict: OfficialVerdictKind, reason: &str, reference: &str) -> OfficialVerdict {
        OfficialVerdict {
            verdict,
            reasons: vec![reason.to_string()],
            references: vec![reference.to_string()],
            lookups: vec!["probe".to_string()],
        }
    }

    #[test]
    fn test_stronger_verdict_overrides() {
        let merged = merge_fragments(vec![
            fragment(
                OfficialVerdictKind::NeedsOfficialLink,
                "check suggested regulators",
                "https://www.sebi.gov.in",
            ),
            fragment(
                OfficialVerdictKind::Verified,
                "matched on regulator page",
                "https://www.fda.gov",
            ),
        ]);
        assert_eq!(merged.verdict, OfficialVerdictKind::Verified);
    }

    #[test]
    fn test_weaker_verdict_never_downgrades() {
        let merged = merge_fragments(vec![
            fragment(
                OfficialVerdictKind::Verified,
                "matched on regulator page",
                "https://www.fda.gov",
            ),
            OfficialVerdict::unverified("nothing in keyword map"),
        ]);
        assert_eq!(merged.verdict, OfficialVerdictKind::Verified);
    }

    #[test]
    fn test_lists_append_and_dedupe() {
        let merged = merge_fragments(vec![
            fragment(
                OfficialVerdictKind::NeedsOfficialLink,
                "reason a",
                "https://www.sebi.gov.in",
            ),
            fragment(
                OfficialVerdictKind::NeedsOfficialLink,
                "reason a",
                "https://www.sebi.gov.in",
            ),
            fragment(
                OfficialVerdictKind::NeedsOfficialLink,
                "reason b",
                "https://www.nseindia.com",
            ),
        ]);
        assert_eq!(merged.reasons, vec!["reason a", "reason b"]);
        assert_eq!(
            merged.references,
            vec!["https://www.sebi.gov.in", "https://www.nseindia.com"]
        );
        assert_eq!(merged.lookups, vec!["probe"]);
    }

    #[test]
    fn test_empty_fragments_yield_explicit_unverified() {
        let merged = merge_fragments(Vec::new());
        assert_eq!(merged.verdict, OfficialVerdictKind::Unverified);
        assert_eq!(merged.reasons, vec!["no official record matched"]);
    }

    #[test]
    fn test_seed_reason_dropped_once_real_reasons_exist() {
        let merged = merge_fragments(vec![fragment(
            OfficialVerdictKind::Unverified,
            "source unreachable",
            "",
        )]);
        assert!(!merged.reasons.iter().any(|r| r == "no official record matched"));
        assert!(merged.reasons.iter().any(|r| r == "source unreachable"));
    }
}
