//! Financial identifier grammars and extraction
//!
//! Supports pattern validation of:
//! - Legal Entity Identifiers (LEI): 20 alphanumeric characters
//! - Security identifiers (ISIN): 2 letters + 9 alphanumeric + 1 check digit
//! - Corporate identifiers (CIN): 21-character registration codes
//! - Advisor identifiers: a loose token grammar AND a strict registration
//!   grammar (`IA######` / `INA######`). Call sites in the wild disagree on
//!   which one applies, so both are exposed as separately named kinds.
//!
//! Pattern validity is a pure function of the input string. Network
//! resolution, when wanted, lives elsewhere and never feeds back into it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Identifier categories with fixed grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    /// Legal Entity Identifier (global)
    Lei,
    /// Security identifier (ISIN-style)
    Isin,
    /// Corporate registration identifier
    Cin,
    /// Loose advisor identifier token (4-20 alphanumeric/hyphen)
    AdvisorId,
    /// Strict advisor registration (`IA` or `INA` + 6 digits)
    AdvisorReg,
}

impl IdentifierKind {
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierKind::Lei => "LEI",
            IdentifierKind::Isin => "ISIN",
            IdentifierKind::Cin => "CIN",
            IdentifierKind::AdvisorId => "ADVISOR-ID",
            IdentifierKind::AdvisorReg => "ADVISOR-REG",
        }
    }
}

/// Pattern-validation result for one candidate identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierCheck {
    /// The normalized (trimmed, uppercased) input
    pub input: String,
    pub kind: IdentifierKind,
    /// Pure function of the input string against the kind's grammar
    pub pattern_valid: bool,
}

/// An identifier discovered in free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundIdentifier {
    pub kind: IdentifierKind,
    pub value: String,
}

// Validation grammars (anchored, applied after normalization)
static LEI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]{20}$").unwrap());

static ISIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").unwrap());

static CIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[LUAP][0-9]{5}[A-Z]{2}[0-9]{4}[A-Z]{3}[0-9]{6}$").unwrap());

static ADVISOR_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Z\-]{4,20}$").unwrap());

static ADVISOR_REG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:IA|INA)[0-9]{6}$").unwrap());

// Extraction scans (word-bounded, inside larger text, case-insensitive;
// `normalize` uppercases whatever they find)
static LEI_SCAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z0-9]{18}[0-9]{2}\b").unwrap());

static ISIN_SCAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z]{2}[A-Z0-9]{9}[0-9]\b").unwrap());

static CIN_SCAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[LUAP][0-9]{5}[A-Z]{2}[0-9]{4}[A-Z]{3}[0-9]{6}\b").unwrap()
});

// Advisor ids are only captured when annotated, to avoid swallowing
// arbitrary uppercase tokens. Consecutive annotation words are consumed
// before capturing, so `SEBI Regn: <id>` yields the id and not `Regn`.
static ADVISOR_SCAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:SEBI|REGISTRATION|REGN|REG)\b[\s:.\-]*)+([0-9A-Z][0-9A-Z\-]{3,19})\b")
        .unwrap()
});

/// Normalize a candidate identifier: trim and uppercase
pub fn normalize(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Validate a candidate identifier against its kind's fixed grammar.
///
/// Malformed input never fails; it yields `pattern_valid = false`.
pub fn validate(input: &str, kind: IdentifierKind) -> IdentifierCheck {
    let normalized = normalize(input);
    let pattern_valid = match kind {
        IdentifierKind::Lei => LEI_RE.is_match(&normalized),
        IdentifierKind::Isin => ISIN_RE.is_match(&normalized),
        IdentifierKind::Cin => CIN_RE.is_match(&normalized),
        IdentifierKind::AdvisorId => ADVISOR_ID_RE.is_match(&normalized),
        IdentifierKind::AdvisorReg => ADVISOR_REG_RE.is_match(&normalized),
    };
    IdentifierCheck {
        input: normalized,
        kind,
        pattern_valid,
    }
}

fn try_add(
    found: &mut Vec<FoundIdentifier>,
    seen: &mut HashSet<String>,
    kind: IdentifierKind,
    value: &str,
) {
    let value = normalize(value);
    let key = format!("{:?}:{}", kind, value);
    if seen.insert(key) {
        found.push(FoundIdentifier { kind, value });
    }
}

/// Extract candidate identifiers from free text, deduplicated.
///
/// The advisor grammar is deliberately loose, so advisor ids are only
/// captured when they follow a registration annotation.
pub fn extract_identifiers(text: &str) -> Vec<FoundIdentifier> {
    let mut found = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    if text.is_empty() {
        return found;
    }

    for cap in LEI_SCAN.find_iter(text) {
        try_add(&mut found, &mut seen, IdentifierKind::Lei, cap.as_str());
    }
    for cap in ISIN_SCAN.find_iter(text) {
        let value = cap.as_str();
        // An all-alphanumeric 20-char token already claimed as LEI stays LEI
        let lei_key = format!("{:?}:{}", IdentifierKind::Lei, normalize(value));
        if !seen.contains(&lei_key) {
            try_add(&mut found, &mut seen, IdentifierKind::Isin, value);
        }
    }
    for cap in CIN_SCAN.find_iter(text) {
        try_add(&mut found, &mut seen, IdentifierKind::Cin, cap.as_str());
    }
    for cap in ADVISOR_SCAN.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            // Annotation words never carry digits; real advisor ids do
            if m.as_str().bytes().any(|b| b.is_ascii_digit()) {
                try_add(&mut found, &mut seen, IdentifierKind::AdvisorId, m.as_str());
            }
        }
    }

    found
}

/// Validate every extracted identifier against its own grammar
pub fn validate_found(found: &[FoundIdentifier]) -> Vec<IdentifierCheck> {
    found.iter().map(|f| validate(&f.value, f.kind)).collect()
}
