//! LLM-based bibliographic field extraction.
//!
//! This module turns one [`PaperInput`] into a [`FieldSet`] by sending a
//! single extraction prompt to an OpenAI-compatible chat-completions
//! endpoint and parsing the delimited response.

use crate::error::{CiteError, Result};
use crate::fields::{FieldSet, PaperInput};
use crate::prompts::field_extraction::build_extraction_prompt;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default endpoint: Gemini's OpenAI-compatible surface
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Narrow seam to the generation service: one prompt in, one text out.
///
/// Lets tests exercise the parsing and accumulation logic with a
/// deterministic stub instead of a live endpoint.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible API response structures
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

/// Chat-completions client for the generation service.
pub struct ChatCompletionClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    /// Create a new client from config
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CiteError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl GenerationService for ChatCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.1
        });

        let api_url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(CiteError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CiteError::Api {
                code: status.as_u16() as i32,
                message: format!("Generation API error: {} - {}", status, error_text),
            });
        }

        let api_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            CiteError::Api {
                code: 0,
                message: format!("Failed to parse generation response: {}", e),
            }
        })?;

        if let Some(usage) = api_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Generation API usage"
            );
        }

        let content = api_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}

/// Extract the 14 bibliographic fields for one paper.
///
/// Builds the extraction prompt, makes one generation call, and parses the
/// delimited response. A response that does not split into exactly 14
/// pieces surfaces as [`CiteError::ShapeMismatch`]; the caller owns the
/// degraded-row policy.
pub async fn extract_fields(
    service: &dyn GenerationService,
    input: &PaperInput,
) -> Result<FieldSet> {
    let prompt = build_extraction_prompt(&input.link, &input.text);

    debug!(link = %input.link, "Sending extraction request");
    let raw = service.generate(&prompt).await?;
    debug!(response_len = raw.len(), "Received generation response");

    FieldSet::parse(&raw)
}
