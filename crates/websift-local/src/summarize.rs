//! Chunk summarization and cross-result synthesis over a chat backend.

use crate::anthropic::AnthropicClient;
use crate::config::Config;
use crate::openai::OpenAiClient;
use websift_core::{
    ChatBackend, ChatMessage, Error, GenerateOptions, Result, ResultSummary,
};

const SYSTEM_PROMPT: &str = "You are a helpful research assistant.";

/// Pick whichever generation backend has credentials, OpenAI first. Neither
/// configured is a hard configuration failure; callers surface it as a
/// per-chunk placeholder, not a pipeline abort.
pub fn resolve_chat_backend(
    cfg: &Config,
    client: &reqwest::Client,
) -> Result<Box<dyn ChatBackend>> {
    if cfg.openai_api_key.is_some() {
        Ok(Box::new(OpenAiClient::from_config(client.clone(), cfg)?))
    } else if cfg.anthropic_api_key.is_some() {
        Ok(Box::new(AnthropicClient::from_config(client.clone(), cfg)?))
    } else {
        Err(Error::NotConfigured(
            "no generation backend configured; set OPENAI_API_KEY or ANTHROPIC_API_KEY"
                .to_string(),
        ))
    }
}

pub struct Summarizer {
    // A missing generation credential must degrade per chunk, not abort the
    // pipeline, so an unconfigured summarizer is still constructible and
    // fails on use.
    backend: std::result::Result<Box<dyn ChatBackend>, String>,
}

impl Summarizer {
    pub fn new(backend: Box<dyn ChatBackend>) -> Self {
        Self { backend: Ok(backend) }
    }

    pub fn from_config(cfg: &Config, client: &reqwest::Client) -> Self {
        match resolve_chat_backend(cfg, client) {
            Ok(backend) => Self::new(backend),
            Err(e) => Self {
                backend: Err(e.to_string()),
            },
        }
    }

    fn backend(&self) -> Result<&dyn ChatBackend> {
        match &self.backend {
            Ok(b) => Ok(b.as_ref()),
            Err(reason) => Err(Error::NotConfigured(reason.clone())),
        }
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().ok().map(|b| b.name())
    }

    fn summarize_prompt(text: &str, question: &str) -> String {
        format!(
            "Use the page text below to answer the question.\n\n\
             Page text:\n{text}\n\n\
             Question:\n{question}\n\n\
             Provide a short answer (2-6 sentences). At the end, include a short \
             quoted snippet (<=40 chars) that supports the answer."
        )
    }

    fn synthesis_prompt(question: &str, summaries: &[ResultSummary]) -> String {
        let mut prompt = String::from(
            "You are a synthesizer. Given these summarized search results, write a \
             concise (2-5 sentence) answer to the original question and cite 1-2 of \
             the source URLs.\n\n",
        );
        prompt.push_str(&format!("Question: {question}\n\nSummaries:\n"));
        for (i, s) in summaries.iter().enumerate() {
            let title = s.title.as_deref().unwrap_or("(untitled)");
            prompt.push_str(&format!("[{}] {title} - {}\n{}\n\n", i + 1, s.url, s.summary));
        }
        prompt
    }

    /// Short grounded answer for one chunk. The quoted-excerpt instruction is
    /// a prompt-level grounding hint; nothing verifies it against the chunk.
    pub async fn summarize(&self, text: &str, question: &str, max_tokens: u64) -> Result<String> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::summarize_prompt(text, question)),
        ];
        let opts = GenerateOptions {
            max_tokens: Some(max_tokens),
            temperature: Some(0.2),
            timeout_ms: None,
        };
        self.backend()?.generate(&messages, &opts).await
    }

    /// One cross-result answer with citations, built from the per-result
    /// summaries.
    pub async fn synthesize(
        &self,
        question: &str,
        summaries: &[ResultSummary],
        max_tokens: u64,
    ) -> Result<String> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::synthesis_prompt(question, summaries)),
        ];
        let opts = GenerateOptions {
            max_tokens: Some(max_tokens),
            temperature: Some(0.2),
            timeout_ms: None,
        };
        self.backend()?.generate(&messages, &opts).await
    }
}
