//! Robots-gated page fetching.

use crate::{extract, robots};
use std::time::Duration;
use websift_core::{Error, PageFetcher, Result};

pub const USER_AGENT: &str = concat!("websift/", env!("CARGO_PKG_VERSION"));

/// Agent token checked against robots.txt groups. The fetch itself identifies
/// as `USER_AGENT`; robots rules are evaluated for the generic crawler.
const ROBOTS_AGENT: &str = "*";

/// Build the shared HTTP client with an identifying user-agent and safety
/// timeouts. Per-request timeouts still apply on top.
pub fn default_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Fetch(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct TextFetcher {
    client: reqwest::Client,
    max_chars: usize,
}

impl TextFetcher {
    pub fn new(client: reqwest::Client, max_chars: usize) -> Self {
        Self { client, max_chars }
    }
}

#[async_trait::async_trait]
impl PageFetcher for TextFetcher {
    /// Fetch `url` and return its extracted main text, bounded to the
    /// configured char budget. A robots disallow fails before any page
    /// request is made.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String> {
        if !robots::allowed(&self.client, url, ROBOTS_AGENT, timeout).await {
            return Err(Error::Policy(format!(
                "fetching disallowed by robots.txt: {url}"
            )));
        }

        let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let resp = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("page fetch HTTP {status}")));
        }

        let body = resp.text().await.map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(extract::page_text_from_html(&body, self.max_chars))
    }
}
