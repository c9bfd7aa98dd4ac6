//! Curated registry and regulator keyword map
//!
//! Both are explicitly constructed, immutable configuration objects: loaded
//! once (from JSON or the built-in defaults) and passed into the checks that
//! need them. No ambient global state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors loading configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One tracked entity in the curated registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRecord {
    pub aliases: Vec<String>,
    pub lei: Option<String>,
    pub isin: Option<String>,
    pub cin: Option<String>,
    pub advisor_id: Option<String>,
    pub sector: Option<String>,
    pub source: Option<String>,
    pub valid_till: Option<String>,
    pub official_sites: Vec<String>,
}

impl EntityRecord {
    /// Best cached identifier, in registry preference order
    fn primary_id(&self) -> Option<&String> {
        self.lei
            .as_ref()
            .or(self.isin.as_ref())
            .or(self.advisor_id.as_ref())
            .or(self.cin.as_ref())
    }
}

/// Result of matching a claim against the curated registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupResult {
    pub found: bool,
    pub entity: Option<String>,
    pub sector: Option<String>,
    pub source: Option<String>,
    pub id: Option<String>,
    pub valid_till: Option<String>,
    pub official_sites: Vec<String>,
    /// Set when `found` is false
    pub reason: Option<String>,
}

impl LookupResult {
    pub fn miss(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Default::default()
        }
    }
}

/// Curated entity registry: name -> record, matched by alias substring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuratedRegistry {
    entities: BTreeMap<String, EntityRecord>,
}

impl CuratedRegistry {
    pub fn new(entities: BTreeMap<String, EntityRecord>) -> Self {
        Self { entities }
    }

    /// Load from a JSON file mapping entity name -> record
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let entities = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        Ok(Self { entities })
    }

    /// Small built-in demo registry
    pub fn builtin() -> Self {
        let mut entities = BTreeMap::new();
        entities.insert(
            "Novapharm Labs".to_string(),
            EntityRecord {
                aliases: vec!["novapharm".to_string(), "nova pharm".to_string()],
                lei: Some("NOVA12345678901234AB".to_string()),
                isin: Some("INE114A01011".to_string()),
                sector: Some("pharma".to_string()),
                source: Some("registry".to_string()),
                valid_till: Some("2026-12-31".to_string()),
                official_sites: vec!["https://www.novapharmlabs.example/investors".to_string()],
                ..Default::default()
            },
        );
        entities.insert(
            "Meridian Finvest".to_string(),
            EntityRecord {
                aliases: vec!["meridian finvest".to_string(), "meridian capital".to_string()],
                advisor_id: Some("INA000012345".to_string()),
                sector: Some("markets".to_string()),
                source: Some("advisor-register".to_string()),
                official_sites: vec!["https://www.meridianfinvest.example".to_string()],
                ..Default::default()
            },
        );
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Match a claim against every known name and alias (case-folded
    /// substring). First match in name order wins.
    pub fn lookup(&self, claim: &str) -> LookupResult {
        let claim_l = claim.to_lowercase();
        if claim_l.trim().is_empty() {
            return LookupResult::miss("empty claim");
        }

        for (name, record) in &self.entities {
            let mut aliases = vec![name.clone()];
            aliases.extend(record.aliases.iter().cloned());
            if aliases.iter().any(|a| claim_l.contains(&a.to_lowercase())) {
                return LookupResult {
                    found: true,
                    entity: Some(name.clone()),
                    sector: record.sector.clone(),
                    source: record.source.clone(),
                    id: record.primary_id().cloned(),
                    valid_till: record.valid_till.clone(),
                    official_sites: record.official_sites.clone(),
                    reason: None,
                };
            }
        }
        LookupResult::miss("no entity match")
    }
}

/// A regulator reference for one sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regulator {
    pub name: String,
    pub url: String,
}

/// Keywords and regulators for one sector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorRoute {
    pub keywords: Vec<String>,
    pub regulators: Vec<Regulator>,
}

/// A regulator suggested for a piece of claim text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatorSuggestion {
    pub sector: String,
    pub name: String,
    pub url: String,
}

/// Sector -> keywords -> regulators map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegulatorMap {
    sectors: BTreeMap<String, SectorRoute>,
}

impl RegulatorMap {
    pub fn new(sectors: BTreeMap<String, SectorRoute>) -> Self {
        Self { sectors }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let sectors = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        Ok(Self { sectors })
    }

    /// Built-in sector map covering the common announcement domains
    pub fn builtin() -> Self {
        fn regulator(name: &str, url: &str) -> Regulator {
            Regulator {
                name: name.to_string(),
                url: url.to_string(),
            }
        }
        let mut sectors = BTreeMap::new();
        sectors.insert(
            "pharma".to_string(),
            SectorRoute {
                keywords: ["drug", "fda", "clinical", "trial", "approval", "molecule"]
                    .map(String::from)
                    .to_vec(),
                regulators: vec![
                    regulator("FDA", "https://www.fda.gov/drugs/drug-approvals-and-databases"),
                    regulator("CDSCO", "https://cdsco.gov.in/opencms/opencms/en/Home/"),
                    regulator("EMA", "https://www.ema.europa.eu/en/medicines"),
                ],
            },
        );
        sectors.insert(
            "markets".to_string(),
            SectorRoute {
                keywords: ["ipo", "listing", "acquisition", "merger", "dividend", "buyback"]
                    .map(String::from)
                    .to_vec(),
                regulators: vec![
                    regulator("SEBI", "https://www.sebi.gov.in/"),
                    regulator("NSE", "https://www.nseindia.com/companies-listing/corporate-filings-announcements"),
                    regulator("BSE", "https://www.bseindia.com/corporates/ann.html"),
                ],
            },
        );
        sectors.insert(
            "banking".to_string(),
            SectorRoute {
                keywords: ["bank", "rbi", "deposit", "nbfc", "licence"]
                    .map(String::from)
                    .to_vec(),
                regulators: vec![regulator("RBI", "https://www.rbi.org.in/")],
            },
        );
        Self { sectors }
    }

    /// Direct sector lookup
    pub fn route(&self, sector: &str) -> Option<&SectorRoute> {
        self.sectors.get(&sector.to_lowercase())
    }

    /// Infer sectors from free text and surface their regulators,
    /// deduplicated by URL
    pub fn suggest(&self, text: &str) -> Vec<RegulatorSuggestion> {
        let t = text.to_lowercase();
        let mut hits = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (sector, route) in &self.sectors {
            if route.keywords.iter().any(|k| t.contains(&k.to_lowercase())) {
                for r in &route.regulators {
                    if seen.insert(r.url.clone()) {
                        hits.push(RegulatorSuggestion {
                            sector: sector.clone(),
                            name: r.name.clone(),
                            url: r.url.clone(),
                        });
                    }
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_alias() {
        let registry = CuratedRegistry::builtin();
        let result = registry.lookup("Breaking: Novapharm gets FDA nod for new drug");
        assert!(result.found);
        assert_eq!(result.entity.as_deref(), Some("Novapharm Labs"));
        assert!(result.id.is_some());
        assert!(!result.official_sites.is_empty());
    }

    #[test]
    fn test_lookup_miss_has_reason() {
        let registry = CuratedRegistry::builtin();
        let result = registry.lookup("Unknown Widgets Inc announces results");
        assert!(!result.found);
        assert!(result.reason.is_some());
    }

    #[test]
    fn test_lookup_empty_claim() {
        let result = CuratedRegistry::builtin().lookup("   ");
        assert!(!result.found);
    }

    #[test]
    fn test_suggest_maps_keywords_to_regulators() {
        let map = RegulatorMap::builtin();
        let hits = map.suggest("New drug approval expected after clinical trial");
        assert!(hits.iter().any(|h| h.name == "FDA"));
        assert!(hits.iter().all(|h| h.sector == "pharma"));
    }

    #[test]
    fn test_suggest_dedupes_by_url() {
        let map = RegulatorMap::builtin();
        // both keyword sets fire; URLs still unique
        let hits = map.suggest("ipo listing dividend buyback merger acquisition");
        let mut urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), hits.len());
    }

    #[test]
    fn test_route_is_case_insensitive() {
        let map = RegulatorMap::builtin();
        assert!(map.route("PHARMA").is_some());
        assert!(map.route("aviation").is_none());
    }
}
