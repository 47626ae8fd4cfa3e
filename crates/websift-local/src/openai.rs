//! OpenAI chat.completions backend.

use crate::config::Config;
use serde::{Deserialize, Serialize};
use websift_core::{ChatBackend, ChatMessage, Error, GenerateOptions, Result};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn from_config(client: reqwest::Client, cfg: &Config) -> Result<Self> {
        let Some(api_key) = cfg.openai_api_key.clone() else {
            return Err(Error::NotConfigured(
                "missing OPENAI_API_KEY for the openai generation backend".to_string(),
            ));
        };
        Ok(Self {
            client,
            api_key,
            model: cfg
                .openai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: cfg
                .openai_endpoint
                .clone()
                .unwrap_or_else(|| OPENAI_ENDPOINT.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Map an HTTP status to an error message the shared classifier can bucket.
pub(crate) fn llm_status_error(backend: &str, status: reqwest::StatusCode) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        Error::Llm(format!("{backend} authentication failed (HTTP {status})"))
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Error::Llm(format!("{backend} rate limit exceeded (HTTP {status})"))
    } else {
        Error::Llm(format!("{backend} HTTP {status}"))
    }
}

pub(crate) fn llm_transport_error(backend: &str, e: reqwest::Error) -> Error {
    if e.is_connect() || e.is_timeout() {
        Error::Llm(format!("{backend} connection error: {e}"))
    } else {
        Error::Llm(format!("{backend}: {e}"))
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, messages: &[ChatMessage], opts: &GenerateOptions) -> Result<String> {
        let req = ChatCompletionsRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: opts.max_tokens,
            temperature: opts.temperature,
            stream: Some(false),
        };

        let timeout_ms = opts.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        let resp = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&req)
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| llm_transport_error("openai chat.completions", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(llm_status_error("openai chat.completions", status));
        }

        let parsed: ChatCompletionsResponse =
            resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::Llm("openai chat.completions returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use websift_core::LlmFailureKind;

    #[test]
    fn missing_key_is_not_configured() {
        let err = OpenAiClient::from_config(reqwest::Client::new(), &Config::empty()).unwrap_err();
        assert!(matches!(err, Error::NotConfigured(_)), "got {err:?}");
    }

    #[test]
    fn status_errors_classify_into_known_buckets() {
        let auth = llm_status_error("openai chat.completions", reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(
            LlmFailureKind::classify(&auth.to_string()),
            LlmFailureKind::Authentication
        );
        let rate = llm_status_error(
            "openai chat.completions",
            reqwest::StatusCode::TOO_MANY_REQUESTS,
        );
        assert_eq!(
            LlmFailureKind::classify(&rate.to_string()),
            LlmFailureKind::RateLimit
        );
        let other = llm_status_error("openai chat.completions", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(
            LlmFailureKind::classify(&other.to_string()),
            LlmFailureKind::Other
        );
    }

    #[test]
    fn parses_minimal_chat_completions_shape() {
        let js = r#"
        {
          "choices": [
            {"message": {"content": "  hello  "}}
          ]
        }
        "#;
        let parsed: ChatCompletionsResponse = serde_json::from_str(js).unwrap();
        assert_eq!(parsed.choices[0].message.content, "  hello  ");
    }
}
