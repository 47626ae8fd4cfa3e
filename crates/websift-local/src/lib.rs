//! Local (reqwest-backed) implementations of the websift pipeline:
//! robots policy check, Google/Bing search, robots-gated page fetching with
//! HTML extraction, paragraph chunking, LLM summarization, and the
//! browse-and-answer orchestrator.

pub mod anthropic;
pub mod browse;
pub mod chunk;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod openai;
pub mod robots;
pub mod search;
pub mod summarize;

pub use browse::Browser;
pub use config::Config;
pub use fetch::{default_http_client, TextFetcher};
pub use summarize::Summarizer;
