//! Search provider backends and selection policy.
//!
//! Two interchangeable HTTP backends: Google Programmable Search (primary,
//! needs an API key + engine id) and Bing Web Search (fallback, single key).
//! Both are single-shot with a bounded timeout; transport errors surface as
//! `Error::Search` and the caller decides whether to continue.

use crate::config::Config;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Instant;
use websift_core::{
    Error, ProviderChoice, Result, SearchProvider, SearchProviderId, SearchQuery, SearchResponse,
    SearchResult,
};

/// Upstream ceiling: Google's Programmable Search API rejects num > 10, and a
/// question rarely needs more candidate sources than that.
pub const MAX_RESULTS: usize = 10;

const GOOGLE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const BING_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

fn timeout_ms_from_query(q: &SearchQuery) -> u64 {
    // Provider requests can hang indefinitely without an explicit timeout.
    // Keep a conservative cap even if callers pass something huge.
    q.timeout_ms.unwrap_or(10_000).clamp(1_000, 60_000)
}

fn capped_results(q: &SearchQuery) -> usize {
    q.max_results.unwrap_or(3).clamp(1, MAX_RESULTS)
}

#[derive(Debug, Clone)]
pub struct GoogleSearchProvider {
    client: reqwest::Client,
    api_key: String,
    cse_id: String,
    endpoint: String,
}

impl GoogleSearchProvider {
    pub fn from_config(client: reqwest::Client, cfg: &Config) -> Result<Self> {
        let (Some(api_key), Some(cse_id)) = (cfg.google_api_key.clone(), cfg.google_cse_id.clone())
        else {
            return Err(Error::NotConfigured(
                "missing GOOGLE_API_KEY and GOOGLE_CSE_ID for the google search backend"
                    .to_string(),
            ));
        };
        Ok(Self {
            client,
            api_key,
            cse_id,
            endpoint: cfg
                .google_endpoint
                .clone()
                .unwrap_or_else(|| GOOGLE_ENDPOINT.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleSearchResponse {
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    link: Option<String>,
    title: Option<String>,
    snippet: Option<String>,
}

#[async_trait::async_trait]
impl SearchProvider for GoogleSearchProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse> {
        let t0 = Instant::now();
        let max_results = capped_results(q);
        let timeout_ms = timeout_ms_from_query(q);

        let num = max_results.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", q.query.as_str()),
                ("num", num.as_str()),
            ])
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("google search HTTP {status}")));
        }

        let parsed: GoogleSearchResponse = resp
            .json()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;

        let mut out = Vec::new();
        for item in parsed.items.unwrap_or_default().into_iter().take(max_results) {
            let Some(url) = item.link else { continue };
            out.push(SearchResult {
                url,
                title: item.title,
                snippet: item.snippet,
                source: "google".to_string(),
            });
        }

        let mut timings_ms = BTreeMap::new();
        timings_ms.insert("search".to_string(), t0.elapsed().as_millis());

        Ok(SearchResponse {
            results: out,
            provider: "google".to_string(),
            timings_ms,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BingSearchProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl BingSearchProvider {
    pub fn from_config(client: reqwest::Client, cfg: &Config) -> Result<Self> {
        let Some(api_key) = cfg.bing_api_key.clone() else {
            return Err(Error::NotConfigured(
                "missing BING_API_KEY for the bing search backend".to_string(),
            ));
        };
        Ok(Self {
            client,
            api_key,
            endpoint: cfg
                .bing_endpoint
                .clone()
                .unwrap_or_else(|| BING_ENDPOINT.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct BingSearchResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    value: Option<Vec<BingWebResult>>,
}

#[derive(Debug, Deserialize)]
struct BingWebResult {
    url: String,
    name: Option<String>,
    snippet: Option<String>,
}

#[async_trait::async_trait]
impl SearchProvider for BingSearchProvider {
    fn name(&self) -> &'static str {
        "bing"
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse> {
        let t0 = Instant::now();
        let max_results = capped_results(q);
        let timeout_ms = timeout_ms_from_query(q);

        let count = max_results.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&[("q", q.query.as_str()), ("count", count.as_str())])
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("bing search HTTP {status}")));
        }

        let parsed: BingSearchResponse = resp
            .json()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;

        let mut out = Vec::new();
        if let Some(values) = parsed.web_pages.and_then(|w| w.value) {
            for r in values.into_iter().take(max_results) {
                out.push(SearchResult {
                    url: r.url,
                    title: r.name,
                    snippet: r.snippet,
                    source: "bing".to_string(),
                });
            }
        }

        let mut timings_ms = BTreeMap::new();
        timings_ms.insert("search".to_string(), t0.elapsed().as_millis());

        Ok(SearchResponse {
            results: out,
            provider: "bing".to_string(),
            timings_ms,
        })
    }
}

/// Resolve a provider choice against the configured credentials.
///
/// An explicit choice is honored (and fails if its credentials are absent);
/// `Auto` prefers Google, falls back to Bing, and errors when neither is
/// configured. Missing credentials are a startup-time misconfiguration, never
/// a silent empty result.
pub fn resolve_provider(
    cfg: &Config,
    client: &reqwest::Client,
    choice: ProviderChoice,
) -> Result<Box<dyn SearchProvider>> {
    match choice {
        ProviderChoice::Explicit(SearchProviderId::Google) => Ok(Box::new(
            GoogleSearchProvider::from_config(client.clone(), cfg)?,
        )),
        ProviderChoice::Explicit(SearchProviderId::Bing) => {
            Ok(Box::new(BingSearchProvider::from_config(client.clone(), cfg)?))
        }
        ProviderChoice::Auto => {
            if cfg.google_configured() {
                Ok(Box::new(GoogleSearchProvider::from_config(
                    client.clone(),
                    cfg,
                )?))
            } else if cfg.bing_configured() {
                Ok(Box::new(BingSearchProvider::from_config(client.clone(), cfg)?))
            } else {
                Err(Error::NotConfigured(
                    "no search provider configured; set GOOGLE_API_KEY and GOOGLE_CSE_ID \
                     or BING_API_KEY"
                        .to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;
    use std::net::SocketAddr;

    #[test]
    fn parses_minimal_google_shape() {
        let js = r#"
        {
          "items": [
            {"link":"https://example.com","title":"Example","snippet":"Hello"}
          ]
        }
        "#;
        let parsed: GoogleSearchResponse = serde_json::from_str(js).unwrap();
        let items = parsed.items.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link.as_deref(), Some("https://example.com"));
        assert_eq!(items[0].title.as_deref(), Some("Example"));
        assert_eq!(items[0].snippet.as_deref(), Some("Hello"));
    }

    #[test]
    fn parses_minimal_bing_shape() {
        let js = r#"
        {
          "webPages": {
            "value": [
              {"url":"https://example.com","name":"Example","snippet":"Hello"}
            ]
          }
        }
        "#;
        let parsed: BingSearchResponse = serde_json::from_str(js).unwrap();
        let values = parsed.web_pages.unwrap().value.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].url, "https://example.com");
        assert_eq!(values[0].name.as_deref(), Some("Example"));
    }

    #[test]
    fn requested_count_is_capped_at_the_upstream_ceiling() {
        let q = SearchQuery {
            query: "x".to_string(),
            max_results: Some(50),
            timeout_ms: None,
        };
        assert_eq!(capped_results(&q), MAX_RESULTS);
        let q = SearchQuery {
            query: "x".to_string(),
            max_results: None,
            timeout_ms: None,
        };
        assert_eq!(capped_results(&q), 3);
    }

    #[test]
    fn auto_prefers_google_then_bing_then_errors() {
        let client = reqwest::Client::new();

        let mut cfg = Config::empty();
        cfg.google_api_key = Some("gk".to_string());
        cfg.google_cse_id = Some("cx".to_string());
        cfg.bing_api_key = Some("bk".to_string());
        let p = resolve_provider(&cfg, &client, ProviderChoice::Auto).unwrap();
        assert_eq!(p.name(), "google");

        let mut cfg = Config::empty();
        cfg.bing_api_key = Some("bk".to_string());
        let p = resolve_provider(&cfg, &client, ProviderChoice::Auto).unwrap();
        assert_eq!(p.name(), "bing");

        let err = resolve_provider(&Config::empty(), &client, ProviderChoice::Auto)
            .err()
            .unwrap();
        assert!(matches!(err, Error::NotConfigured(_)), "got {err:?}");
    }

    #[test]
    fn explicit_choice_with_missing_credentials_is_an_error() {
        let client = reqwest::Client::new();
        let mut cfg = Config::empty();
        cfg.bing_api_key = Some("bk".to_string());
        // Bing is configured, but the explicit google choice must not fall back.
        let err = resolve_provider(
            &cfg,
            &client,
            ProviderChoice::Explicit(SearchProviderId::Google),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::NotConfigured(_)), "got {err:?}");
    }

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn google_provider_sends_key_pair_and_normalizes_results() {
        let addr = serve(Router::new().route(
            "/customsearch/v1",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("key").map(String::as_str), Some("gk"));
                assert_eq!(params.get("cx").map(String::as_str), Some("cx"));
                assert_eq!(params.get("num").map(String::as_str), Some("2"));
                Json(serde_json::json!({
                    "items": [
                        {"link": "https://a.example/", "title": "A", "snippet": "sa"},
                        {"link": "https://b.example/", "title": "B", "snippet": "sb"},
                        {"title": "no url, skipped"}
                    ]
                }))
            }),
        ))
        .await;

        let mut cfg = Config::empty();
        cfg.google_api_key = Some("gk".to_string());
        cfg.google_cse_id = Some("cx".to_string());
        cfg.google_endpoint = Some(format!("http://{addr}/customsearch/v1"));
        let provider =
            GoogleSearchProvider::from_config(reqwest::Client::new(), &cfg).unwrap();

        let resp = provider
            .search(&SearchQuery {
                query: "test query".to_string(),
                max_results: Some(2),
                timeout_ms: Some(2_000),
            })
            .await
            .unwrap();

        assert_eq!(resp.provider, "google");
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].url, "https://a.example/");
        assert_eq!(resp.results[0].title.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn bing_provider_sends_subscription_header() {
        let addr = serve(Router::new().route(
            "/v7.0/search",
            get(|headers: axum::http::HeaderMap| async move {
                let key = headers
                    .get("Ocp-Apim-Subscription-Key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                assert_eq!(key, "bk");
                Json(serde_json::json!({
                    "webPages": {
                        "value": [
                            {"url": "https://a.example/", "name": "A", "snippet": "sa"}
                        ]
                    }
                }))
            }),
        ))
        .await;

        let mut cfg = Config::empty();
        cfg.bing_api_key = Some("bk".to_string());
        cfg.bing_endpoint = Some(format!("http://{addr}/v7.0/search"));
        let provider = BingSearchProvider::from_config(reqwest::Client::new(), &cfg).unwrap();

        let resp = provider
            .search(&SearchQuery {
                query: "test query".to_string(),
                max_results: Some(1),
                timeout_ms: Some(2_000),
            })
            .await
            .unwrap();
        assert_eq!(resp.provider, "bing");
        assert_eq!(resp.results.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_a_search_error() {
        let addr = serve(Router::new().route(
            "/v7.0/search",
            get(|| async { (axum::http::StatusCode::FORBIDDEN, "denied") }),
        ))
        .await;

        let mut cfg = Config::empty();
        cfg.bing_api_key = Some("bk".to_string());
        cfg.bing_endpoint = Some(format!("http://{addr}/v7.0/search"));
        let provider = BingSearchProvider::from_config(reqwest::Client::new(), &cfg).unwrap();

        let err = provider
            .search(&SearchQuery {
                query: "test query".to_string(),
                max_results: None,
                timeout_ms: Some(2_000),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Search(_)), "got {err:?}");
    }
}
