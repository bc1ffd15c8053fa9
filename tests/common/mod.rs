//! Test helpers for integration tests.
//!
//! Provides a recording messenger and a canned fetcher so the dispatcher and
//! the HTTP surface can run without the network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use feed_relay::telegram::{Messenger, SendOptions, SentMessage};
use feed_relay::feed::SourceFetcher;
use feed_relay::{DedupStore, Entry, FeedSource, Relay, RelayError, Release, Result};

/// Messenger that records every call.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<String>>,
    pinned: Mutex<Vec<i64>>,
    unpinned: Mutex<Vec<i64>>,
    next_id: Mutex<i64>,
}

impl RecordingMessenger {
    /// Messenger whose first message gets ID `first`.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next_id: Mutex::new(first - 1),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn pinned(&self) -> Vec<i64> {
        self.pinned.lock().unwrap().clone()
    }

    pub fn unpinned(&self) -> Vec<i64> {
        self.unpinned.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, text: &str, _options: &SendOptions) -> Result<SentMessage> {
        self.sent.lock().unwrap().push(text.to_string());
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        Ok(SentMessage { message_id: *id })
    }

    async fn pin_message(&self, message_id: i64, _silent: bool) -> Result<()> {
        self.pinned.lock().unwrap().push(message_id);
        Ok(())
    }

    async fn unpin_message(&self, message_id: i64) -> Result<()> {
        self.unpinned.lock().unwrap().push(message_id);
        Ok(())
    }
}

/// Fetcher serving canned feeds and releases.
#[derive(Default)]
pub struct CannedFetcher {
    feeds: Mutex<HashMap<String, Vec<Entry>>>,
    releases: Mutex<HashMap<String, Release>>,
}

impl CannedFetcher {
    pub fn set_feed(&self, url: &str, entries: Vec<Entry>) {
        self.feeds.lock().unwrap().insert(url.to_string(), entries);
    }

    pub fn set_release(&self, repo: &str, release: Release) {
        self.releases.lock().unwrap().insert(repo.to_string(), release);
    }
}

#[async_trait]
impl SourceFetcher for CannedFetcher {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<Entry>> {
        self.feeds
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| RelayError::Fetch(format!("HTTP error: 404 Not Found ({url})")))
    }

    async fn fetch_latest_release(&self, repo: &str) -> Result<Release> {
        self.releases
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .ok_or_else(|| RelayError::Fetch(format!("HTTP error: 404 Not Found ({repo})")))
    }
}

pub const BLOG_URL: &str = "https://deno.com/feed";
pub const DENO_REPO: &str = "denoland/deno";

/// Two-source table: one feed and one pinned release source.
pub fn test_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::feed("blog", BLOG_URL),
        FeedSource::release("release", DENO_REPO, "Deno").pinned(),
    ]
}

/// Entry with a stable ID, title and link.
pub fn post(id: u32) -> Entry {
    Entry::new(format!("post-{id}"))
        .with_title(format!("Post {id}"))
        .with_link(format!("https://deno.com/blog/post-{id}"))
}

/// Newest-first feed of posts `1..=n`.
pub fn posts(n: u32) -> Vec<Entry> {
    (1..=n).rev().map(post).collect()
}

/// Build a relay over `store` with fresh fakes.
pub fn build_relay(
    store: Arc<dyn DedupStore>,
) -> (Arc<Relay>, Arc<RecordingMessenger>, Arc<CannedFetcher>) {
    build_relay_with(store, RecordingMessenger::starting_at(1))
}

/// Build a relay over `store` sending through `messenger`.
pub fn build_relay_with(
    store: Arc<dyn DedupStore>,
    messenger: RecordingMessenger,
) -> (Arc<Relay>, Arc<RecordingMessenger>, Arc<CannedFetcher>) {
    let messenger = Arc::new(messenger);
    let fetcher = Arc::new(CannedFetcher::default());
    let relay = Relay::new(store, messenger.clone(), fetcher.clone(), test_sources());
    (Arc::new(relay), messenger, fetcher)
}
