use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("disallowed by policy: {0}")]
    Policy(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("search failed: {0}")]
    Search(String),
    #[error("llm failed: {0}")]
    Llm(String),
    #[error("not supported: {0}")]
    NotSupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of generation-backend failures, used only for
/// user-facing messaging. Matching is substring-based on the error text; the
/// `Other` bucket keeps the raw message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmFailureKind {
    Authentication,
    RateLimit,
    Connection,
    Other,
}

impl LlmFailureKind {
    pub fn classify(message: &str) -> Self {
        let m = message.to_ascii_lowercase();
        if m.contains("authentication") || m.contains("unauthorized") || m.contains("401") {
            Self::Authentication
        } else if m.contains("rate limit") || m.contains("429") {
            Self::RateLimit
        } else if m.contains("connection") || m.contains("connect") || m.contains("timed out") {
            Self::Connection
        } else {
            Self::Other
        }
    }

    /// Short message suitable for embedding in a result placeholder.
    pub fn user_message(&self, raw: &str) -> String {
        match self {
            Self::Authentication => "authentication failed; check the API key".to_string(),
            Self::RateLimit => "rate limit exceeded; try again later".to_string(),
            Self::Connection => "could not reach the generation backend".to_string(),
            Self::Other => format!("generation failed: {raw}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub max_results: Option<usize>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub provider: String,
    pub timings_ms: BTreeMap<String, u128>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse>;
}

/// Retrieves the readable main text of a page, bounded in size.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub max_tokens: Option<u64>,
    pub temperature: Option<f64>,
    pub timeout_ms: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: Some(400),
            temperature: Some(0.2),
            timeout_ms: None,
        }
    }
}

/// One text-generation capability (chat-completion shaped). Single-shot; no
/// retries at this layer.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, messages: &[ChatMessage], opts: &GenerateOptions) -> Result<String>;
}

/// Per-search-result outcome. `summary` holds either real summarized content
/// or a human-readable failure placeholder; failures never abort the bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub url: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub summary: String,
}

impl ResultSummary {
    pub fn from_result(r: &SearchResult, summary: String) -> Self {
        Self {
            url: r.url.clone(),
            title: r.title.clone(),
            snippet: r.snippet.clone(),
            summary,
        }
    }
}

/// Terminal output of one `answer()` call. `final_answer` is absent when
/// synthesis was skipped or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerBundle {
    pub question: String,
    pub results: Vec<ResultSummary>,
    pub final_answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchProviderId {
    Google,
    Bing,
}

/// Provider selection policy: an explicit backend is honored as-is; `Auto`
/// resolves to whichever backend has credentials, primary first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    Auto,
    Explicit(SearchProviderId),
}

impl std::str::FromStr for ProviderChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "google" => Ok(Self::Explicit(SearchProviderId::Google)),
            "bing" => Ok(Self::Explicit(SearchProviderId::Bing)),
            other => Err(Error::NotSupported(format!(
                "unknown search provider {other:?}; expected auto, google, or bing"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn classifies_known_llm_failures_by_substring() {
        assert_eq!(
            LlmFailureKind::classify("authentication failed (HTTP 401 Unauthorized)"),
            LlmFailureKind::Authentication
        );
        assert_eq!(
            LlmFailureKind::classify("rate limit exceeded (HTTP 429)"),
            LlmFailureKind::RateLimit
        );
        assert_eq!(
            LlmFailureKind::classify("connection error: dns failure"),
            LlmFailureKind::Connection
        );
        assert_eq!(
            LlmFailureKind::classify("model returned empty choices"),
            LlmFailureKind::Other
        );
    }

    #[test]
    fn other_failures_keep_the_raw_message() {
        let msg = LlmFailureKind::Other.user_message("model exploded");
        assert!(msg.contains("model exploded"), "got {msg:?}");
    }

    #[test]
    fn provider_choice_parses_known_names() {
        assert_eq!(
            ProviderChoice::from_str("auto").unwrap(),
            ProviderChoice::Auto
        );
        assert_eq!(
            ProviderChoice::from_str("Google").unwrap(),
            ProviderChoice::Explicit(SearchProviderId::Google)
        );
        assert_eq!(
            ProviderChoice::from_str(" bing ").unwrap(),
            ProviderChoice::Explicit(SearchProviderId::Bing)
        );
        assert!(ProviderChoice::from_str("duckduckgo").is_err());
    }

    #[test]
    fn answer_bundle_round_trips_through_json() {
        let bundle = AnswerBundle {
            question: "q".to_string(),
            results: vec![ResultSummary {
                url: "https://example.com/a".to_string(),
                title: Some("A".to_string()),
                snippet: None,
                summary: "ok".to_string(),
            }],
            final_answer: None,
        };
        let js = serde_json::to_string(&bundle).unwrap();
        let back: AnswerBundle = serde_json::from_str(&js).unwrap();
        assert_eq!(back.results.len(), 1);
        assert!(back.final_answer.is_none());
    }
}
