//! Process configuration, read once at startup and passed by reference.
//!
//! Call sites never touch the environment directly; everything an `answer()`
//! call needs (credentials, endpoint overrides, size budgets) lives here so
//! credential injection stays testable.

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_either(preferred: &str, fallback: &str) -> Option<String> {
    env(preferred).or_else(|| env(fallback))
}

fn env_usize(key: &str, default: usize) -> usize {
    env(key)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env(key).and_then(|s| s.parse::<u64>().ok()).unwrap_or(default)
}

/// Char cap applied to extracted page text.
pub const DEFAULT_PAGE_MAX_CHARS: usize = 150_000;
/// Char cap per summarization chunk; stays under typical generation-context
/// limits once prompt overhead is added.
pub const DEFAULT_CHUNK_MAX_CHARS: usize = 12_000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SUMMARY_MAX_TOKENS: u64 = 400;

#[derive(Debug, Clone, Default)]
pub struct Config {
    // Primary search backend (Google Programmable Search): key pair.
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    // Fallback search backend (Bing Web Search): single key.
    pub bing_api_key: Option<String>,
    // Generation backends; one of the two must be configured to summarize.
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,

    // Endpoint/model overrides; used by tests and private deployments.
    pub google_endpoint: Option<String>,
    pub bing_endpoint: Option<String>,
    pub openai_endpoint: Option<String>,
    pub anthropic_endpoint: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_model: Option<String>,

    // Size budgets; tuned defaults, not product contracts.
    pub page_max_chars: usize,
    pub chunk_max_chars: usize,
    pub fetch_timeout_ms: u64,
    pub summary_max_tokens: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            google_api_key: env_either("WEBSIFT_GOOGLE_API_KEY", "GOOGLE_API_KEY"),
            google_cse_id: env_either("WEBSIFT_GOOGLE_CSE_ID", "GOOGLE_CSE_ID"),
            bing_api_key: env_either("WEBSIFT_BING_API_KEY", "BING_API_KEY"),
            openai_api_key: env_either("WEBSIFT_OPENAI_API_KEY", "OPENAI_API_KEY"),
            anthropic_api_key: env_either("WEBSIFT_ANTHROPIC_API_KEY", "ANTHROPIC_API_KEY"),
            google_endpoint: env("WEBSIFT_GOOGLE_ENDPOINT"),
            bing_endpoint: env("WEBSIFT_BING_ENDPOINT"),
            openai_endpoint: env("WEBSIFT_OPENAI_ENDPOINT"),
            anthropic_endpoint: env("WEBSIFT_ANTHROPIC_ENDPOINT"),
            openai_model: env("WEBSIFT_OPENAI_MODEL"),
            anthropic_model: env("WEBSIFT_ANTHROPIC_MODEL"),
            page_max_chars: env_usize("WEBSIFT_PAGE_MAX_CHARS", DEFAULT_PAGE_MAX_CHARS),
            chunk_max_chars: env_usize("WEBSIFT_CHUNK_MAX_CHARS", DEFAULT_CHUNK_MAX_CHARS),
            fetch_timeout_ms: env_u64("WEBSIFT_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS),
            summary_max_tokens: env_u64(
                "WEBSIFT_SUMMARY_MAX_TOKENS",
                DEFAULT_SUMMARY_MAX_TOKENS,
            ),
        }
    }

    /// A config with no credentials and default budgets; handy for tests.
    pub fn empty() -> Self {
        Self {
            page_max_chars: DEFAULT_PAGE_MAX_CHARS,
            chunk_max_chars: DEFAULT_CHUNK_MAX_CHARS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
            ..Self::default()
        }
    }

    pub fn google_configured(&self) -> bool {
        self.google_api_key.is_some() && self.google_cse_id.is_some()
    }

    pub fn bing_configured(&self) -> bool {
        self.bing_api_key.is_some()
    }

    pub fn generation_configured(&self) -> bool {
        self.openai_api_key.is_some() || self.anthropic_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_needs_both_halves_of_the_key_pair() {
        let mut cfg = Config::empty();
        cfg.google_api_key = Some("k".to_string());
        assert!(!cfg.google_configured());
        cfg.google_cse_id = Some("cx".to_string());
        assert!(cfg.google_configured());
    }

    #[test]
    fn generation_is_configured_by_either_backend_key() {
        let mut cfg = Config::empty();
        assert!(!cfg.generation_configured());
        cfg.anthropic_api_key = Some("k".to_string());
        assert!(cfg.generation_configured());
        cfg.anthropic_api_key = None;
        cfg.openai_api_key = Some("k".to_string());
        assert!(cfg.generation_configured());
    }

    #[test]
    fn empty_config_carries_default_budgets() {
        let cfg = Config::empty();
        assert_eq!(cfg.page_max_chars, DEFAULT_PAGE_MAX_CHARS);
        assert_eq!(cfg.chunk_max_chars, DEFAULT_CHUNK_MAX_CHARS);
        assert_eq!(cfg.fetch_timeout_ms, DEFAULT_FETCH_TIMEOUT_MS);
    }
}
