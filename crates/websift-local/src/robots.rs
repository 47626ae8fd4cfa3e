//! robots.txt policy check.
//!
//! Single best-effort fetch of `scheme://host/robots.txt`, parsed into
//! user-agent groups of Allow/Disallow prefix rules. Any failure to retrieve
//! or parse the file fails open: a missing robots file is common and must not
//! block legitimate fetches.

use std::time::Duration;
use websift_core::{Error, Result};

#[derive(Debug, Clone)]
struct Rule {
    allow: bool,
    path: String,
}

#[derive(Debug, Clone)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    groups: Vec<Group>,
}

impl RobotsTxt {
    pub fn parse(body: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        // Consecutive User-agent lines share one rule block.
        let mut last_was_agent = false;

        for raw in body.lines() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                last_was_agent = false;
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            match key.as_str() {
                "user-agent" => {
                    let agent = value.to_ascii_lowercase();
                    if last_was_agent {
                        if let Some(g) = groups.last_mut() {
                            g.agents.push(agent);
                        }
                    } else {
                        groups.push(Group {
                            agents: vec![agent],
                            rules: Vec::new(),
                        });
                    }
                    last_was_agent = true;
                }
                "allow" | "disallow" => {
                    last_was_agent = false;
                    // An empty Disallow value allows everything; no rule needed.
                    if value.is_empty() {
                        continue;
                    }
                    if let Some(g) = groups.last_mut() {
                        g.rules.push(Rule {
                            allow: key == "allow",
                            path: value.to_string(),
                        });
                    }
                }
                _ => {
                    // Crawl-delay, Sitemap, and friends are irrelevant here.
                    last_was_agent = false;
                }
            }
        }

        Self { groups }
    }

    fn group_for<'a>(&'a self, agent: &str) -> Option<&'a Group> {
        let agent = agent.to_ascii_lowercase();
        // A group naming this agent (token containment, like the stdlib
        // parsers do) beats the wildcard group.
        let named = self
            .groups
            .iter()
            .find(|g| {
                g.agents
                    .iter()
                    .any(|a| a != "*" && !a.is_empty() && agent.contains(a.as_str()))
            });
        named.or_else(|| self.groups.iter().find(|g| g.agents.iter().any(|a| a == "*")))
    }

    /// Whether `agent` may fetch `path`. Longest matching rule wins; a tie
    /// goes to Allow; no matching rule means allowed.
    pub fn allows(&self, agent: &str, path: &str) -> bool {
        let path = if path.is_empty() { "/" } else { path };
        let Some(group) = self.group_for(agent) else {
            return true;
        };

        let mut best_len = 0usize;
        let mut best_allow = true;
        for rule in &group.rules {
            if !path.starts_with(rule.path.as_str()) {
                continue;
            }
            let len = rule.path.len();
            if len > best_len || (len == best_len && rule.allow) {
                best_len = len;
                best_allow = rule.allow;
            }
        }
        best_allow
    }
}

/// Derive the robots.txt URL for a target URL.
pub fn robots_url_for(target: &str) -> Result<String> {
    let u = url::Url::parse(target).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let host = u
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("url has no host: {target}")))?;
    let mut out = format!("{}://{host}", u.scheme());
    if let Some(port) = u.port() {
        out.push_str(&format!(":{port}"));
    }
    out.push_str("/robots.txt");
    Ok(out)
}

/// Best-effort robots check for `url`. Fails open on any retrieval or parse
/// problem, including a missing robots file; a present `Disallow` match is
/// the only thing that returns false.
pub async fn allowed(client: &reqwest::Client, url: &str, agent: &str, timeout: Duration) -> bool {
    let Ok(robots_url) = robots_url_for(url) else {
        return true;
    };
    let Ok(target) = url::Url::parse(url) else {
        return true;
    };

    let resp = match client.get(robots_url).timeout(timeout).send().await {
        Ok(r) => r,
        Err(_) => return true,
    };
    if !resp.status().is_success() {
        return true;
    }
    let body = match resp.text().await {
        Ok(b) => b,
        Err(_) => return true,
    };

    let mut path = target.path().to_string();
    if let Some(q) = target.query() {
        path.push('?');
        path.push_str(q);
    }
    RobotsTxt::parse(&body).allows(agent, &path)
}
