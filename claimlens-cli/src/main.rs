//! ClaimLens CLI
//!
//! Credibility checks for financial announcements and tips.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use claimlens_core::{
    validate, CuratedRegistry, IdentifierKind, RiskLevel, Sentiment,
};
use claimlens_net::{
    AnthropicBackend, AnthropicConfig, GleifClient, NetConfig, OfficialSource, OpenAIBackend,
    OpenAIBackendConfig, SharedBackend, StoreConfig,
};
use claimlens_runtime::{
    AnalysisPipeline, AnalysisRequest, DocumentInput, PipelineConfig, SaveOutcome,
};

#[derive(Parser)]
#[command(name = "claimlens")]
#[command(author, version, about = "ClaimLens: credibility checks for market announcements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an announcement (URL, document, pasted text, or any mix)
    Analyze {
        /// Announcement link
        #[arg(short, long)]
        url: Option<String>,

        /// Announcement document (PDF, HTML or plain text)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Pasted claim text
        #[arg(short, long)]
        text: Option<String>,

        /// Company name hint
        #[arg(long, default_value = "")]
        hint: String,

        /// Claimed direction (positive|negative), enables the price check
        #[arg(long)]
        sentiment: Option<String>,

        /// Symbol to fetch daily prices for
        #[arg(long)]
        symbol: Option<String>,

        /// Save the evidence case to the configured store
        #[arg(long)]
        save: bool,

        /// Output file for the evidence JSON (default: evidence_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// LLM model for the explanation
        #[arg(short, long, default_value = "claude-3-5-haiku-20241022")]
        model: String,

        /// Anthropic API key (or set ANTHROPIC_API_KEY env var)
        #[arg(long, env = "ANTHROPIC_API_KEY")]
        anthropic_key: Option<String>,

        /// OpenAI API key (or set OPENAI_API_KEY env var)
        #[arg(long, env = "OPENAI_API_KEY")]
        openai_key: Option<String>,

        /// Use OpenAI instead of Anthropic for the explanation
        #[arg(long)]
        openai: bool,

        /// Domain reputation API key
        #[arg(long, env = "REPUTATION_API_KEY")]
        reputation_key: Option<String>,

        /// URL scan API key
        #[arg(long, env = "URLSCAN_API_KEY")]
        urlscan_key: Option<String>,

        /// Price feed API key
        #[arg(long, env = "PRICE_FEED_API_KEY")]
        price_key: Option<String>,

        /// Evidence store REST endpoint
        #[arg(long, env = "EVIDENCE_STORE_URL")]
        store_url: Option<String>,

        /// Evidence store API key
        #[arg(long, env = "EVIDENCE_STORE_KEY")]
        store_key: Option<String>,

        /// Official announcement page to probe (repeatable, name=url)
        #[arg(long = "probe")]
        probes: Vec<String>,

        /// Resolve grammar-valid LEIs against the live registry
        #[arg(long)]
        gleif: bool,
    },

    /// Pattern-check one identifier
    Validate {
        /// Identifier kind (lei|isin|cin|advisor-id|advisor-reg)
        #[arg(short, long)]
        kind: String,

        /// The identifier value
        value: String,

        /// Also resolve valid LEIs against the live registry
        #[arg(long)]
        resolve: bool,
    },

    /// Look up an entity name or LEI
    Lookup {
        /// Entity name, alias, or LEI code
        query: String,

        /// Also query the live LEI registry
        #[arg(long)]
        resolve: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Analyze {
            url,
            file,
            text,
            hint,
            sentiment,
            symbol,
            save,
            output,
            model,
            anthropic_key,
            openai_key,
            openai,
            reputation_key,
            urlscan_key,
            price_key,
            store_url,
            store_key,
            probes,
            gleif,
        } => {
            run_analyze(AnalyzeArgs {
                url,
                file,
                text,
                hint,
                sentiment,
                symbol,
                save,
                output,
                model,
                anthropic_key,
                openai_key,
                openai,
                reputation_key,
                urlscan_key,
                price_key,
                store_url,
                store_key,
                probes,
                gleif,
            })
            .await?;
        }
        Commands::Validate {
            kind,
            value,
            resolve,
        } => {
            run_validate(&kind, &value, resolve).await?;
        }
        Commands::Lookup { query, resolve } => {
            run_lookup(&query, resolve).await?;
        }
    }

    Ok(())
}

struct AnalyzeArgs {
    url: Option<String>,
    file: Option<PathBuf>,
    text: Option<String>,
    hint: String,
    sentiment: Option<String>,
    symbol: Option<String>,
    save: bool,
    output: Option<PathBuf>,
    model: String,
    anthropic_key: Option<String>,
    openai_key: Option<String>,
    openai: bool,
    reputation_key: Option<String>,
    urlscan_key: Option<String>,
    price_key: Option<String>,
    store_url: Option<String>,
    store_key: Option<String>,
    probes: Vec<String>,
    gleif: bool,
}

async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    println!("🔎 ClaimLens - announcement credibility check\n");

    if args.url.is_none() && args.file.is_none() && args.text.is_none() {
        anyhow::bail!("nothing to analyze: pass --url, --file, or --text");
    }

    let sentiment = match args.sentiment.as_deref() {
        None => None,
        Some("positive") => Some(Sentiment::Positive),
        Some("negative") => Some(Sentiment::Negative),
        Some(other) => anyhow::bail!("unknown sentiment '{}' (use positive|negative)", other),
    };

    let document = match &args.file {
        Some(path) => {
            let bytes = fs::read(path)?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(DocumentInput { bytes, filename })
        }
        None => None,
    };

    let backend = build_backend(&args)?;
    let provider = match (&backend, args.openai) {
        (None, _) => "local formatter",
        (Some(_), true) => "OpenAI",
        (Some(_), false) => "Anthropic",
    };
    println!("📡 Explanation: {} | Model: {}", provider, args.model);

    let store = match (args.store_url.clone(), args.store_key.clone()) {
        (None, None) => None,
        (store_url, store_key) => Some(StoreConfig::new(store_url, store_key)),
    };

    let config = PipelineConfig {
        net: NetConfig::default(),
        official_sources: parse_probes(&args.probes)?,
        reputation_api_key: args.reputation_key.clone(),
        urlscan_api_key: args.urlscan_key.clone(),
        price_api_key: args.price_key.clone(),
        gleif_enabled: args.gleif,
        store,
        backend,
        ..Default::default()
    };
    let pipeline = AnalysisPipeline::new(config)?;

    let request = AnalysisRequest {
        url: args.url.clone(),
        document,
        text: args.text.clone(),
        company_hint: args.hint.clone(),
        sentiment,
        prices: None,
        symbol: args.symbol.clone(),
        filing: None,
        filing_history: Vec::new(),
        save: args.save,
    };

    let outcome = pipeline.analyze(request).await;
    let case = &outcome.case;

    println!("\n🧮 Credibility score: {}/100", case.score);
    println!("\n{:<26} {:>6}  {}", "Dimension", "Points", "Why");
    println!("{}", "-".repeat(72));
    for row in &case.breakdown {
        println!("{:<26} {:>+6}  {}", row.dimension, row.contribution, row.why);
    }

    if let Some(official) = &case.official {
        println!("\n🏛️  Official sources: {:?}", official.verdict);
        for reason in &official.reasons {
            println!("   - {}", reason);
        }
        for reference in &official.references {
            println!("   → {}", reference);
        }
    }

    if let Some(hygiene) = &case.url_hygiene {
        println!("\n🔗 URL hygiene: {:?}", hygiene.verdict);
        for reason in &hygiene.reasons {
            println!("   - {}", reason);
        }
    }

    let tip_icon = match outcome.tip.risk {
        RiskLevel::High => "🚨",
        RiskLevel::Medium => "⚠️ ",
        RiskLevel::Low => "✅",
    };
    println!(
        "\n{} Tip risk: {:?} ({} hype points)",
        tip_icon, outcome.tip.risk, outcome.tip.score
    );
    for reason in &outcome.tip.reasons {
        println!("   - {}", reason);
    }

    println!("\n💬 Explanation:\n{}", case.ai_explanation);

    match &outcome.save {
        SaveOutcome::Saved { hash } => println!("\n💾 Evidence saved (hash {})", hash),
        SaveOutcome::Failed { reason } => println!("\n⚠️  Evidence save failed: {}", reason),
        SaveOutcome::Skipped => {}
    }

    let output_path = args.output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        PathBuf::from(format!("evidence_{}.json", timestamp))
    });
    fs::write(&output_path, serde_json::to_string_pretty(&case.export_json())?)?;
    println!("\n📄 Evidence JSON written to: {}", output_path.display());

    Ok(())
}

fn build_backend(args: &AnalyzeArgs) -> Result<Option<SharedBackend>> {
    if args.openai {
        let Some(key) = &args.openai_key else {
            anyhow::bail!("OpenAI API key required. Set OPENAI_API_KEY or use --openai-key");
        };
        let backend = OpenAIBackend::new(OpenAIBackendConfig::openai(key, &args.model))?;
        return Ok(Some(std::sync::Arc::new(backend)));
    }
    match &args.anthropic_key {
        Some(key) => {
            let backend = AnthropicBackend::new(AnthropicConfig::new(key, &args.model))?;
            Ok(Some(std::sync::Arc::new(backend)))
        }
        // No key is fine: the deterministic formatter takes over
        None => Ok(None),
    }
}

fn parse_probes(probes: &[String]) -> Result<Vec<OfficialSource>> {
    probes
        .iter()
        .map(|spec| match spec.split_once('=') {
            Some((name, url)) if !name.is_empty() && !url.is_empty() => Ok(OfficialSource {
                name: name.to_string(),
                url: url.to_string(),
            }),
            _ => anyhow::bail!("bad --probe '{}': expected name=url", spec),
        })
        .collect()
}

async fn run_validate(kind: &str, value: &str, resolve: bool) -> Result<()> {
    let kind = match kind {
        "lei" => IdentifierKind::Lei,
        "isin" => IdentifierKind::Isin,
        "cin" => IdentifierKind::Cin,
        "advisor-id" => IdentifierKind::AdvisorId,
        "advisor-reg" => IdentifierKind::AdvisorReg,
        other => anyhow::bail!(
            "unknown kind '{}' (use lei|isin|cin|advisor-id|advisor-reg)",
            other
        ),
    };

    let check = validate(value, kind);
    let icon = if check.pattern_valid { "✅" } else { "❌" };
    println!(
        "{} {} '{}' — pattern {}",
        icon,
        kind.label(),
        check.input,
        if check.pattern_valid { "valid" } else { "invalid" }
    );

    if resolve && kind == IdentifierKind::Lei && check.pattern_valid {
        println!("\n🌐 Resolving against the LEI registry...");
        let client = GleifClient::new(&NetConfig::default())?;
        match client.resolve(&check.input).await {
            Ok(record) => {
                println!("   {} — {}", record.lei, record.legal_name);
                if let Some(status) = record.status {
                    println!("   registration status: {}", status);
                }
            }
            Err(e) => println!("   ⚠️  resolution failed: {}", e),
        }
    }

    Ok(())
}

async fn run_lookup(query: &str, resolve: bool) -> Result<()> {
    let registry = CuratedRegistry::builtin();
    let result = registry.lookup(query);

    if result.found {
        println!("✅ Curated registry match");
        println!("   entity: {}", result.entity.as_deref().unwrap_or("-"));
        println!("   sector: {}", result.sector.as_deref().unwrap_or("-"));
        println!("   id: {}", result.id.as_deref().unwrap_or("-"));
        if let Some(valid_till) = &result.valid_till {
            println!("   valid till: {}", valid_till);
        }
        for site in &result.official_sites {
            println!("   → {}", site);
        }
    } else {
        println!(
            "❌ No curated match ({})",
            result.reason.as_deref().unwrap_or("unknown")
        );
    }

    if resolve {
        println!("\n🌐 Querying the LEI registry...");
        let client = GleifClient::new(&NetConfig::default())?;
        match client.resolve(query).await {
            Ok(record) => {
                println!("   {} — {}", record.lei, record.legal_name);
                if let Some(status) = record.status {
                    println!("   registration status: {}", status);
                }
            }
            Err(e) => println!("   ⚠️  no LEI record: {}", e),
        }
    }

    Ok(())
}
