//! Official-source probe
//!
//! Fetches configured regulator/exchange announcement pages and checks
//! whether a claim's distinctive terms appear there. The probe asserts a
//! match only on strong evidence; anything weaker is a clean fall-through
//! so the verifier can move on to keyword suggestions.

use reqwest::Client;
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{create_http_client, NetConfig, RemoteError};

/// One official announcement page to probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficialSource {
    pub name: String,
    pub url: String,
}

/// A positive probe hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeMatch {
    pub source: String,
    pub url: String,
    pub matched_terms: Vec<String>,
}

/// Probe over a fixed list of official sources
pub struct OfficialSourceProbe {
    client: Client,
    sources: Vec<OfficialSource>,
    /// Minimum distinctive claim terms that must appear on a page
    min_matched_terms: usize,
}

impl OfficialSourceProbe {
    pub fn new(config: &NetConfig, sources: Vec<OfficialSource>) -> Result<Self, RemoteError> {
        Ok(Self {
            client: create_http_client(config)?,
            sources,
            min_matched_terms: 2,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Probe every configured source for the claim. `Ok(None)` means the
    /// probe ran but could not assert a match; errors are per-source and
    /// only surface when no source could be fetched at all.
    pub async fn probe(
        &self,
        claim: &str,
        company_hint: &str,
    ) -> Result<Option<ProbeMatch>, RemoteError> {
        let terms = distinctive_terms(claim, company_hint);
        if terms.is_empty() || self.sources.is_empty() {
            return Ok(None);
        }

        let mut last_err: Option<RemoteError> = None;
        let mut fetched_any = false;

        for source in &self.sources {
            match self.fetch_text(&source.url).await {
                Ok(page_text) => {
                    fetched_any = true;
                    let page_l = page_text.to_lowercase();
                    let matched: Vec<String> = terms
                        .iter()
                        .filter(|t| page_l.contains(t.as_str()))
                        .cloned()
                        .collect();
                    if matched.len() >= self.min_matched_terms {
                        debug!(source = %source.name, ?matched, "official probe matched");
                        return Ok(Some(ProbeMatch {
                            source: source.name.clone(),
                            url: source.url.clone(),
                            matched_terms: matched,
                        }));
                    }
                }
                Err(e) => {
                    warn!(source = %source.name, error = %e, "official source unreachable");
                    last_err = Some(e);
                }
            }
        }

        if fetched_any {
            Ok(None)
        } else {
            Err(last_err.unwrap_or(RemoteError::Http("no sources fetched".to_string())))
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, RemoteError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        let html = response.text().await?;
        Ok(visible_text(&html))
    }
}

/// Strip markup and return the page's visible text
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Distinctive lower-cased terms of a claim: the company hint plus words
/// long enough to be meaningful, stopwords removed
fn distinctive_terms(claim: &str, company_hint: &str) -> Vec<String> {
    const STOPWORDS: &[&str] = &[
        "about", "after", "their", "there", "these", "those", "which", "would", "announcement",
        "announced", "company", "limited",
    ];
    let mut terms: Vec<String> = Vec::new();
    if !company_hint.trim().is_empty() {
        terms.push(company_hint.trim().to_lowercase());
    }
    for word in claim.split(|c: char| !c.is_alphanumeric()) {
        let w = word.to_lowercase();
        if w.len() >= 5 && !STOPWORDS.contains(&w.as_str()) && !terms.contains(&w) {
            terms.push(w);
        }
    }
    terms.truncate(8);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_strips_markup() {
        let html = "<html><body><h1>Announcements</h1><p>Novapharm approval granted</p></body></html>";
        let text = visible_text(html);
        assert!(text.contains("Announcements"));
        assert!(text.contains("Novapharm approval granted"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_distinctive_terms_filters_noise() {
        let terms = distinctive_terms("Company announced record dividend after merger", "Novapharm");
        assert_eq!(terms[0], "novapharm");
        assert!(terms.contains(&"dividend".to_string()));
        assert!(!terms.contains(&"company".to_string()));
        assert!(!terms.contains(&"after".to_string()));
    }

    #[tokio::test]
    async fn test_probe_without_sources_falls_through() {
        let probe =
            OfficialSourceProbe::new(&NetConfig::default(), Vec::new()).expect("probe");
        let result = probe.probe("Novapharm dividend announcement", "").await;
        assert!(matches!(result, Ok(None)));
    }
}
