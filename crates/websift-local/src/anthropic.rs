//! Anthropic messages backend.
//!
//! The messages API takes system content as a top-level field, so system
//! messages are lifted out of the role-tagged list before sending.

use crate::config::Config;
use crate::openai::{llm_status_error, llm_transport_error};
use serde::{Deserialize, Serialize};
use websift_core::{ChatBackend, ChatMessage, Error, GenerateOptions, Result, Role};

const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
// The messages API requires max_tokens; used when the caller leaves it unset.
const FALLBACK_MAX_TOKENS: u64 = 1_024;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl AnthropicClient {
    pub fn from_config(client: reqwest::Client, cfg: &Config) -> Result<Self> {
        let Some(api_key) = cfg.anthropic_api_key.clone() else {
            return Err(Error::NotConfigured(
                "missing ANTHROPIC_API_KEY for the anthropic generation backend".to_string(),
            ));
        };
        Ok(Self {
            client,
            api_key,
            model: cfg
                .anthropic_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: cfg
                .anthropic_endpoint
                .clone()
                .unwrap_or_else(|| ANTHROPIC_ENDPOINT.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u64,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<WireMessage>) {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut rest = Vec::new();
    for m in messages {
        match m.role {
            Role::System => system_parts.push(m.content.as_str()),
            _ => rest.push(WireMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            }),
        }
    }
    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };
    (system, rest)
}

#[async_trait::async_trait]
impl ChatBackend for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(&self, messages: &[ChatMessage], opts: &GenerateOptions) -> Result<String> {
        let (system, wire_messages) = split_system(messages);
        let req = MessagesRequest {
            model: self.model.clone(),
            max_tokens: opts.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            messages: wire_messages,
            system,
            temperature: opts.temperature,
        };

        let timeout_ms = opts.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&req)
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| llm_transport_error("anthropic messages", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(llm_status_error("anthropic messages", status));
        }

        let parsed: MessagesResponse =
            resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        let text = parsed
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Err(Error::Llm(
                "anthropic messages returned no text content".to_string(),
            ));
        }
        Ok(text.trim().to_string())
    }
}
