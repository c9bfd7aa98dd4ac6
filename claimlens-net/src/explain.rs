//! Grounded explanation backend
//!
//! Turns a finished analysis into a short human-readable explanation. An
//! LLM backend may phrase it, but only from the facts already collected;
//! when no backend is configured or the call fails, a deterministic local
//! formatter produces the explanation instead. An analysis therefore always
//! carries an explanation.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use claimlens_core::LookupResult;

/// LLM backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty response")]
    EmptyResponse,
}

/// Generic LLM backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion with system prompt
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Thread-safe reference to an LLM backend
pub type SharedBackend = Arc<dyn LlmBackend>;

/// OpenAI-compatible backend configuration
#[derive(Debug, Clone)]
pub struct OpenAIBackendConfig {
    pub api_key: String,
    /// Base URL override (OpenRouter, local servers)
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u16,
}

impl Default for OpenAIBackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 512,
        }
    }
}

impl OpenAIBackendConfig {
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }
}

/// OpenAI-compatible LLM backend
pub struct OpenAIBackend {
    client: Client<OpenAIConfig>,
    config: OpenAIBackendConfig,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIBackendConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Config("missing API key".to_string()));
        }
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        let client = Client::with_config(openai_config);
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| LlmError::Api(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| LlmError::Api(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build()
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Anthropic backend configuration
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl AnthropicConfig {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens: 512,
        }
    }
}

/// Anthropic Claude backend
pub struct AnthropicBackend {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicBackend {
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Config("missing API key".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system,
            "messages": [
                {"role": "user", "content": user}
            ]
        });

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("Anthropic API error {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        json["content"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|block| block["text"].as_str())
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

const EXPLAIN_SYSTEM_PROMPT: &str = "You explain credibility findings about financial \
announcements. Explain in under 5 lines. Use ONLY the facts provided. Do NOT invent \
sources. If no official sources were found, say the claim is unverified until a \
regulator or exchange link is seen.";

/// Facts an explanation may draw on. Nothing outside this context reaches
/// the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExplainContext {
    pub claim: String,
    pub verdict_text: String,
    pub lookup: Option<LookupResult>,
    pub reasons: Vec<String>,
    pub references: Vec<String>,
}

/// Explanation generator with a deterministic local fallback
#[derive(Default)]
pub struct Explainer {
    backend: Option<SharedBackend>,
}

impl Explainer {
    pub fn new(backend: Option<SharedBackend>) -> Self {
        Self { backend }
    }

    /// Produce an explanation for the context. Infallible: backend errors
    /// fall back to the local formatter.
    pub async fn explain(&self, context: &ExplainContext) -> String {
        let Some(backend) = &self.backend else {
            return format_explanation(context);
        };

        let user = match serde_json::to_string_pretty(context) {
            Ok(facts) => format!("Facts:\n{}", facts),
            Err(_) => return format_explanation(context),
        };

        match backend.generate(EXPLAIN_SYSTEM_PROMPT, &user).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => format_explanation(context),
            Err(e) => {
                warn!(model = backend.model_name(), error = %e, "explanation backend failed");
                format_explanation(context)
            }
        }
    }
}

/// Deterministic structured explanation built only from collected facts
pub fn format_explanation(context: &ExplainContext) -> String {
    let mut lines = vec![format!("**Verdict:** {}", context.verdict_text)];

    if !context.reasons.is_empty() {
        lines.push("**Reasons:**".to_string());
        for reason in context.reasons.iter().take(6) {
            lines.push(format!("- {}", reason));
        }
    }

    let mut references = context.references.clone();
    if let Some(lookup) = &context.lookup {
        for site in &lookup.official_sites {
            if !references.contains(site) {
                references.push(site.clone());
            }
        }
    }
    if !references.is_empty() {
        lines.push("**References:**".to_string());
        for reference in references.iter().take(6) {
            lines.push(format!("- {}", reference));
        }
    }

    lines.join("\n")
}
