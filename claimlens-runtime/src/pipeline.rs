//! Analysis pipeline
//!
//! One announcement in, one immutable evidence case out. The independent
//! signal producers fan out concurrently; network-bound ones run under a
//! timeout and degrade to weaker signals instead of blocking the rest.

use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use claimlens_checks::{OfficialVerifier, RegistryCheck, UrlHygieneCheck};
use claimlens_core::{
    compare_filing, contradiction, score_signals, tip_verdict, CuratedRegistry, EvidenceCase,
    FinancialFigures, HygieneReport, HygieneVerdict, OfficialVerdict, PriceSeries, RegulatorMap,
    Sentiment, Signal, SignalPayload, SignalSet, SocialClassifier, TipVerdict,
    DEFAULT_ANOMALY_THRESHOLD,
};
use claimlens_net::{
    extract_text, Explainer, ExplainContext, EvidenceStoreClient, NetConfig, OfficialSource,
    OfficialSourceProbe, PriceFeedClient, SharedBackend, StoreConfig,
};

/// Pipeline construction settings
pub struct PipelineConfig {
    pub net: NetConfig,
    /// Per-check timeout for network-bound producers
    pub check_timeout_secs: u64,
    pub registry: CuratedRegistry,
    pub regulators: RegulatorMap,
    /// Official announcement pages for the live probe; empty disables it
    pub official_sources: Vec<OfficialSource>,
    pub reputation_api_key: Option<String>,
    pub urlscan_api_key: Option<String>,
    pub price_api_key: Option<String>,
    /// Resolve grammar-valid LEIs against the live registry. Enrichment
    /// only; resolution never affects pattern validity.
    pub gleif_enabled: bool,
    /// Evidence store; `None` disables saving entirely
    pub store: Option<StoreConfig>,
    /// Explanation backend; `None` selects the deterministic formatter
    pub backend: Option<SharedBackend>,
    pub anomaly_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            net: NetConfig::default(),
            check_timeout_secs: 25,
            registry: CuratedRegistry::builtin(),
            regulators: RegulatorMap::builtin(),
            official_sources: Vec::new(),
            reputation_api_key: None,
            urlscan_api_key: None,
            price_api_key: None,
            gleif_enabled: false,
            store: None,
            backend: None,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }
}

/// An uploaded announcement document
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// One announcement to analyze; any subset of fields may be present
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub url: Option<String>,
    pub document: Option<DocumentInput>,
    pub text: Option<String>,
    pub company_hint: String,
    /// Claimed direction, enables the price contradiction check
    pub sentiment: Option<Sentiment>,
    /// Pre-fetched price series; takes precedence over `symbol`
    pub prices: Option<PriceSeries>,
    /// Symbol to fetch prices for when none were supplied
    pub symbol: Option<String>,
    pub filing: Option<FinancialFigures>,
    pub filing_history: Vec<FinancialFigures>,
    /// Attempt one evidence store write after scoring
    pub save: bool,
}

/// What happened to the single save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { hash: String },
    Failed { reason: String },
    Skipped,
}

/// A finished analysis
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub case: EvidenceCase,
    /// Tip-style risk grading of the claim language
    pub tip: TipVerdict,
    pub save: SaveOutcome,
}

/// Orchestrates the checks over one announcement
pub struct AnalysisPipeline {
    registry: CuratedRegistry,
    official: OfficialVerifier,
    hygiene: UrlHygieneCheck,
    identifiers: RegistryCheck,
    prices: Option<PriceFeedClient>,
    store: Option<EvidenceStoreClient>,
    explainer: Explainer,
    check_timeout: Duration,
    anomaly_threshold: f64,
}

impl AnalysisPipeline {
    pub fn new(config: PipelineConfig) -> anyhow::Result<Self> {
        let probe = if config.official_sources.is_empty() {
            None
        } else {
            Some(OfficialSourceProbe::new(
                &config.net,
                config.official_sources.clone(),
            )?)
        };
        let official = OfficialVerifier::new(
            config.registry.clone(),
            config.regulators.clone(),
            probe,
        );

        let reputation = match &config.reputation_api_key {
            Some(key) => Some(claimlens_net::DomainReputationClient::new(
                &config.net,
                Some(key.clone()),
            )?),
            None => None,
        };
        let scanner = match &config.urlscan_api_key {
            Some(key) => Some(claimlens_net::UrlScanClient::new(
                &config.net,
                Some(key.clone()),
            )?),
            None => None,
        };
        let hygiene = UrlHygieneCheck::new(reputation, scanner);

        let prices = match &config.price_api_key {
            Some(key) => Some(PriceFeedClient::new(&config.net, Some(key.clone()))?),
            None => None,
        };

        let gleif = if config.gleif_enabled {
            Some(claimlens_net::GleifClient::new(&config.net)?)
        } else {
            None
        };

        let store = match config.store {
            Some(store_config) => Some(EvidenceStoreClient::new(&config.net, store_config)?),
            None => None,
        };

        Ok(Self {
            registry: config.registry,
            official,
            hygiene,
            identifiers: RegistryCheck::new(gleif),
            prices,
            store,
            explainer: Explainer::new(config.backend),
            check_timeout: Duration::from_secs(config.check_timeout_secs),
            anomaly_threshold: config.anomaly_threshold,
        })
    }

    /// Pipeline with built-in config and no remote collaborators
    pub fn offline() -> Self {
        Self {
            registry: CuratedRegistry::builtin(),
            official: OfficialVerifier::offline(),
            hygiene: UrlHygieneCheck::offline(),
            identifiers: RegistryCheck::offline(),
            prices: None,
            store: None,
            explainer: Explainer::default(),
            check_timeout: Duration::from_secs(25),
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }

    /// Run every applicable check and reduce the signals into an evidence
    /// case. Always returns a complete case with score and breakdown.
    pub async fn analyze(&self, request: AnalysisRequest) -> AnalysisOutcome {
        let text = self.combined_text(&request);
        debug!(chars = text.len(), "analysis text assembled");

        // Entity aliases and identifiers often live in the link itself, so
        // the lookup-facing producers see the URL alongside the claim text
        let lookup_text = match request.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() && text.is_empty() => url.to_string(),
            Some(url) if !url.is_empty() => format!("{}\n{}", text, url),
            _ => text.clone(),
        };

        let (mut official, url_report, fetched_prices) = tokio::join!(
            self.official_signal(&lookup_text, &request.company_hint),
            self.hygiene_signal(request.url.as_deref()),
            self.price_series(&request),
        );

        let bundle = self.identifiers.bundle(&lookup_text);
        let lei_records = match timeout(self.check_timeout, self.identifiers.resolve_leis(&bundle))
            .await
        {
            Ok(records) => records,
            Err(_) => {
                warn!("LEI resolution timed out");
                Vec::new()
            }
        };
        if !lei_records.is_empty() {
            official.lookups.push("gleif".to_string());
            for record in &lei_records {
                official
                    .reasons
                    .push(format!("LEI {} resolved to {}", record.lei, record.legal_name));
            }
        }

        let mut signals = SignalSet::default();
        signals.absorb(Signal::new(SignalPayload::Registry(
            self.registry.lookup(&lookup_text),
        )));
        signals.absorb(Signal::new(SignalPayload::OfficialSource(official)));
        if let Some(report) = url_report {
            signals.absorb(Signal::new(SignalPayload::UrlHygiene(report)));
        }
        signals.absorb(Signal::new(SignalPayload::Identifier(bundle)));
        signals.absorb(Signal::new(SignalPayload::TextPresence {
            chars: text.trim().len(),
        }));

        if !text.trim().is_empty() {
            let reading = SocialClassifier::shared().classify_default(&text);
            let confidence = reading.score;
            signals.absorb(
                Signal::new(SignalPayload::Social(reading)).with_confidence(confidence),
            );
        }

        if let Some(filing) = &request.filing {
            signals.absorb(Signal::new(SignalPayload::Anomaly(compare_filing(
                filing,
                &request.filing_history,
                self.anomaly_threshold,
            ))));
        }

        if let (Some(series), Some(sentiment)) = (&fetched_prices, request.sentiment) {
            signals.absorb(Signal::new(SignalPayload::Contradiction(contradiction(
                series, sentiment,
            ))));
        }

        let ta_contradiction = signals
            .contra
            .as_ref()
            .map(|c| c.contradiction_score >= 2)
            .unwrap_or(false);
        let tip = tip_verdict(&text, ta_contradiction);

        let breakdown = score_signals(&signals);
        info!(score = breakdown.total, "analysis scored");

        let explanation = self
            .explainer
            .explain(&ExplainContext {
                claim: text.chars().take(2000).collect(),
                verdict_text: verdict_text(&signals, breakdown.total),
                lookup: signals.lookup.clone(),
                reasons: signals
                    .official
                    .as_ref()
                    .map(|o| o.reasons.clone())
                    .unwrap_or_default(),
                references: signals
                    .official
                    .as_ref()
                    .map(|o| o.references.clone())
                    .unwrap_or_default(),
            })
            .await;

        let query = request
            .url
            .clone()
            .or_else(|| (!text.trim().is_empty()).then(|| text.chars().take(120).collect()));
        let case = EvidenceCase::assemble(query, signals, breakdown, &text, explanation);

        let save = self.save_case(&case, request.save).await;

        AnalysisOutcome { case, tip, save }
    }

    fn combined_text(&self, request: &AnalysisRequest) -> String {
        let mut parts = Vec::new();
        if let Some(text) = &request.text {
            if !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }
        if let Some(doc) = &request.document {
            let extracted = extract_text(&doc.bytes, &doc.filename);
            if !extracted.trim().is_empty() {
                parts.push(extracted.trim().to_string());
            }
        }
        parts.join("\n")
    }

    async fn official_signal(&self, text: &str, hint: &str) -> OfficialVerdict {
        match timeout(self.check_timeout, self.official.verify(text, hint)).await {
            Ok(verdict) => verdict,
            Err(_) => {
                warn!("official verification timed out");
                OfficialVerdict::unverified("official verification timed out")
            }
        }
    }

    async fn hygiene_signal(&self, url: Option<&str>) -> Option<HygieneReport> {
        let url = url?;
        match timeout(self.check_timeout, self.hygiene.check(url)).await {
            Ok(report) => Some(report),
            Err(_) => {
                warn!(%url, "URL hygiene check timed out");
                Some(HygieneReport {
                    verdict: HygieneVerdict::Caution,
                    reasons: vec!["Hygiene check timed out".to_string()],
                    references: vec![url.to_string()],
                })
            }
        }
    }

    async fn price_series(&self, request: &AnalysisRequest) -> Option<PriceSeries> {
        if let Some(series) = &request.prices {
            return Some(series.clone());
        }
        let symbol = request.symbol.as_deref()?;
        let client = self.prices.as_ref()?;
        match timeout(self.check_timeout, client.daily_closes(symbol)).await {
            Ok(Ok(series)) => Some(series),
            Ok(Err(e)) => {
                warn!(%symbol, error = %e, "price feed unavailable");
                None
            }
            Err(_) => {
                warn!(%symbol, "price feed timed out");
                None
            }
        }
    }

    async fn save_case(&self, case: &EvidenceCase, wanted: bool) -> SaveOutcome {
        if !wanted {
            return SaveOutcome::Skipped;
        }
        let Some(store) = &self.store else {
            return SaveOutcome::Failed {
                reason: "store_not_configured".to_string(),
            };
        };
        match store.save(case).await {
            Ok(receipt) => SaveOutcome::Saved { hash: receipt.hash },
            Err(e) => {
                warn!(error = %e, "evidence save failed");
                SaveOutcome::Failed { reason: e.reason() }
            }
        }
    }
}

/// Human verdict line for the explanation context
fn verdict_text(signals: &SignalSet, score: u8) -> String {
    use claimlens_core::OfficialVerdictKind;
    let official = signals
        .official
        .as_ref()
        .map(|o| o.verdict)
        .unwrap_or(OfficialVerdictKind::Unverified);
    let label = match official {
        OfficialVerdictKind::Verified => "Verified against official sources",
        OfficialVerdictKind::NeedsOfficialLink => "Needs an official link",
        OfficialVerdictKind::Unverified => "Unverified",
    };
    format!("{} (credibility {}/100)", label, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_request_scores_baseline_scenario() {
        let pipeline = AnalysisPipeline::offline();
        let outcome = pipeline.analyze(AnalysisRequest::default()).await;
        assert_eq!(outcome.case.score, 42);
        assert_eq!(outcome.save, SaveOutcome::Skipped);
        assert!(!outcome.case.ai_explanation.is_empty());
    }

    #[tokio::test]
    async fn test_url_only_request_matches_registry_alias() {
        let pipeline = AnalysisPipeline::offline();
        let outcome = pipeline
            .analyze(AnalysisRequest {
                url: Some("https://www.novapharm.example/press/expansion".to_string()),
                ..Default::default()
            })
            .await;
        let lookup = outcome.case.lookup.expect("lookup signal");
        assert!(lookup.found);
        assert_eq!(lookup.entity.as_deref(), Some("Novapharm Labs"));
    }

    #[test]
    fn test_gleif_option_constructs_resolver() {
        let config = PipelineConfig {
            gleif_enabled: true,
            ..Default::default()
        };
        assert!(AnalysisPipeline::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_hype_text_grades_high_risk() {
        let pipeline = AnalysisPipeline::offline();
        let outcome = pipeline
            .analyze(AnalysisRequest {
                text: Some("Guaranteed multibagger, sure shot target 500, assured returns".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(outcome.tip.risk, claimlens_core::RiskLevel::High);
        assert!(outcome.tip.score >= 70);
    }

    #[tokio::test]
    async fn test_prices_and_sentiment_produce_contradiction_row() {
        let closes: Vec<f64> = {
            let mut c = vec![100.0];
            let deltas = [
                2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, -0.5, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, -3.0,
                -3.0, -3.0, -3.0, -3.0, -3.0, -3.0, -3.0, -3.0, -3.0,
            ];
            for d in deltas {
                let last = *c.last().unwrap();
                c.push(last + d);
            }
            c
        };
        let pipeline = AnalysisPipeline::offline();
        let outcome = pipeline
            .analyze(AnalysisRequest {
                text: Some("Record profits announced this quarter by the company".to_string()),
                sentiment: Some(Sentiment::Positive),
                prices: Some(PriceSeries::from_closes(&closes)),
                ..Default::default()
            })
            .await;
        assert!(outcome
            .case
            .breakdown
            .iter()
            .any(|row| row.dimension == "Market Contradiction"));
        assert!(outcome.case.contra.is_some());
    }

    #[tokio::test]
    async fn test_filing_history_produces_anomaly_signal() {
        let history = vec![
            FinancialFigures {
                revenue: Some(100.0),
                profit: Some(10.0),
                eps: Some(1.0),
            },
            FinancialFigures {
                revenue: Some(104.0),
                profit: Some(11.0),
                eps: Some(1.1),
            },
        ];
        let filing = FinancialFigures {
            revenue: Some(400.0),
            profit: Some(12.0),
            eps: Some(1.2),
        };
        let pipeline = AnalysisPipeline::offline();
        let outcome = pipeline
            .analyze(AnalysisRequest {
                filing: Some(filing),
                filing_history: history,
                ..Default::default()
            })
            .await;
        let anomaly = outcome.case.anomaly.expect("anomaly signal");
        assert!(anomaly.any());
        assert_eq!(anomaly.flagged(), vec!["revenue"]);
    }

    #[tokio::test]
    async fn test_save_without_store_reports_failure() {
        let pipeline = AnalysisPipeline::offline();
        let outcome = pipeline
            .analyze(AnalysisRequest {
                save: true,
                ..Default::default()
            })
            .await;
        assert_eq!(
            outcome.save,
            SaveOutcome::Failed {
                reason: "store_not_configured".to_string()
            }
        );
    }
}
