//! The browse-and-answer orchestrator.
//!
//! search → (per result) robots-gated fetch → chunk → summarize per chunk →
//! one synthesis pass across results. Per-result and per-chunk failures are
//! recorded as placeholder text in the bundle; "partial success" is the
//! normal case. Only a missing search provider (at construction) or a search
//! transport failure aborts the call.

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::fetch::TextFetcher;
use crate::search::resolve_provider;
use crate::summarize::Summarizer;
use std::time::Duration;
use websift_core::{
    AnswerBundle, Error, LlmFailureKind, PageFetcher, ProviderChoice, Result, ResultSummary,
    SearchProvider, SearchQuery,
};

pub struct Browser {
    searcher: Box<dyn SearchProvider>,
    fetcher: Box<dyn PageFetcher>,
    summarizer: Summarizer,
    chunk_max_chars: usize,
    fetch_timeout: Duration,
    summary_max_tokens: u64,
}

fn describe_generation_error(e: &Error) -> String {
    match e {
        Error::Llm(msg) => LlmFailureKind::classify(msg).user_message(msg),
        Error::NotConfigured(msg) => msg.clone(),
        other => other.to_string(),
    }
}

impl Browser {
    /// Wire real backends from configuration. Fails with `NotConfigured`
    /// before any network call when no usable search provider exists.
    pub fn from_config(
        cfg: &Config,
        client: &reqwest::Client,
        choice: ProviderChoice,
    ) -> Result<Self> {
        Ok(Self::new(
            resolve_provider(cfg, client, choice)?,
            Box::new(TextFetcher::new(client.clone(), cfg.page_max_chars)),
            Summarizer::from_config(cfg, client),
            cfg,
        ))
    }

    pub fn new(
        searcher: Box<dyn SearchProvider>,
        fetcher: Box<dyn PageFetcher>,
        summarizer: Summarizer,
        cfg: &Config,
    ) -> Self {
        Self {
            searcher,
            fetcher,
            summarizer,
            chunk_max_chars: cfg.chunk_max_chars,
            fetch_timeout: Duration::from_millis(cfg.fetch_timeout_ms),
            summary_max_tokens: cfg.summary_max_tokens,
        }
    }

    /// Answer `question` using up to `top_k` web sources. Results come back
    /// in provider order; each entry carries either a real summary or a
    /// human-readable failure note.
    pub async fn answer(
        &self,
        question: &str,
        top_k: usize,
        synthesize: bool,
    ) -> Result<AnswerBundle> {
        let search = self
            .searcher
            .search(&SearchQuery {
                query: question.to_string(),
                max_results: Some(top_k),
                timeout_ms: Some(self.fetch_timeout.as_millis() as u64),
            })
            .await?;

        let mut results: Vec<ResultSummary> = Vec::with_capacity(search.results.len());
        for r in &search.results {
            let page = match self.fetcher.fetch_text(&r.url, self.fetch_timeout).await {
                Ok(text) => text,
                Err(e) => {
                    results.push(ResultSummary::from_result(
                        r,
                        format!("Could not fetch page: {e}"),
                    ));
                    continue;
                }
            };

            let mut chunk_summaries: Vec<String> = Vec::new();
            for chunk in chunk_text(&page, self.chunk_max_chars) {
                match self
                    .summarizer
                    .summarize(&chunk, question, self.summary_max_tokens)
                    .await
                {
                    Ok(s) => chunk_summaries.push(s),
                    Err(e) => chunk_summaries.push(format!(
                        "[summarization failed: {}]",
                        describe_generation_error(&e)
                    )),
                }
            }
            results.push(ResultSummary::from_result(r, chunk_summaries.join("\n\n")));
        }

        // Synthesis is a best-effort enhancement: skipped with no sources,
        // and a failure leaves final_answer absent rather than erroring.
        let final_answer = if synthesize && !results.is_empty() {
            self.summarizer
                .synthesize(question, &results, self.summary_max_tokens)
                .await
                .ok()
        } else {
            None
        };

        Ok(AnswerBundle {
            question: question.to_string(),
            results,
            final_answer,
        })
    }
}
