//! Upstream fetching.
//!
//! [`SourceFetcher`] is the seam between the dispatcher and the network:
//! [`HttpFetcher`] talks to real feeds and the GitHub API, tests plug in
//! canned data.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use tracing::debug;

use super::types::{Entry, MAX_FEED_SIZE};
use crate::config::FetchConfig;
use crate::release::Release;
use crate::{RelayError, Result};

/// Fetches upstream data for the dispatcher.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch and parse a feed, returning its entries newest first.
    async fn fetch_entries(&self, url: &str) -> Result<Vec<Entry>>;

    /// Fetch the latest release of `repo` (`owner/name`).
    async fn fetch_latest_release(&self, repo: &str) -> Result<Release>;
}

/// HTTP fetcher for feeds and releases.
pub struct HttpFetcher {
    client: Client,
    max_feed_size: u64,
    github_api_base: String,
}

impl HttpFetcher {
    /// Create a fetcher from the fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RelayError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes.min(MAX_FEED_SIZE),
            github_api_base: config.github_api_base.trim_end_matches('/').to_string(),
        })
    }

    fn release_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/releases/latest", self.github_api_base, repo)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<Entry>> {
        validate_url(url)?;
        debug!("Fetching feed {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to fetch feed: {}", e)))?;
        let response = check_status(response)?;

        if let Some(content_length) = response.content_length() {
            check_size(content_length, self.max_feed_size)?;
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to read response: {}", e)))?;
        check_size(bytes.len() as u64, self.max_feed_size)?;

        parse_feed(&bytes)
    }

    async fn fetch_latest_release(&self, repo: &str) -> Result<Release> {
        let url = self.release_url(repo);
        debug!("Fetching latest release {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to fetch release: {}", e)))?;
        let response = check_status(response)?;

        let body = response
            .text()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to read response: {}", e)))?;
        Release::from_json(&body)
    }
}

fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(RelayError::Fetch(format!("HTTP error: {}", response.status())))
    }
}

fn check_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(RelayError::Fetch(format!(
            "feed too large: {} bytes (max {} bytes)",
            size, limit
        )));
    }
    Ok(())
}

/// Parse feed bytes into entries, preserving document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Entry>> {
    let feed = parser::parse(bytes)
        .map_err(|e| RelayError::Parse(format!("failed to parse feed: {}", e)))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let id = Some(entry.id).filter(|id| !id.trim().is_empty());
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| id.clone())
                .unwrap_or_default();
            Entry {
                id,
                title: entry.title.map(|t| t.content),
                link,
                published_at: entry.published.or(entry.updated),
            }
        })
        .collect();

    Ok(entries)
}

/// Validate an upstream URL.
///
/// Only http(s) URLs to public hosts are accepted.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| RelayError::Validation(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RelayError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| RelayError::Validation("URL has no host".to_string()))?;

    let ip = match host {
        url::Host::Domain(domain) => {
            if is_forbidden_hostname(domain) {
                return Err(RelayError::Validation(format!("forbidden host: {}", domain)));
            }
            return Ok(());
        }
        url::Host::Ipv4(ipv4) => IpAddr::V4(ipv4),
        url::Host::Ipv6(ipv6) => IpAddr::V6(ipv6),
    };

    if is_private_ip(&ip) {
        return Err(RelayError::Validation(format!(
            "private IP address not allowed: {}",
            ip
        )));
    }
    Ok(())
}

fn is_forbidden_hostname(host: &str) -> bool {
    let host = host.to_lowercase();
    host == "localhost"
        || [".local", ".localhost", ".internal", ".lan"]
            .iter()
            .any(|suffix| host.ends_with(suffix))
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80 // link-local
        }
    }
}
