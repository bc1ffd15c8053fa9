//! Route dispatcher.
//!
//! One cycle polls one source: fetch, detect the delta, persist the updated
//! record, then send the new messages one by one, oldest first. The record
//! is written before sending, so a failed send loses that message instead
//! of posting it twice on the next poll.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::feed::{compute_new_entries, SourceFetcher};
use crate::format::{format_entry, format_incident, format_release};
use crate::release::compute_new_release;
use crate::source::{FeedSource, SourceKind};
use crate::status::StatusPayload;
use crate::store::{
    load_entry_ids, load_pinned_message, load_release_id, save_entry_ids, save_pinned_message,
    save_release_id, DedupStore,
};
use crate::telegram::{Messenger, SentMessage};
use crate::{RelayError, Result};

/// Summary of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Key of the polled source.
    pub checked: String,
    /// Number of messages sent.
    pub sent: usize,
}

/// Dispatcher context, built once at startup.
pub struct Relay {
    store: Arc<dyn DedupStore>,
    messenger: Arc<dyn Messenger>,
    fetcher: Arc<dyn SourceFetcher>,
    sources: Vec<FeedSource>,
    instant_view: HashMap<String, String>,
}

impl Relay {
    /// Create a dispatcher over `sources`, polled in table order.
    pub fn new(
        store: Arc<dyn DedupStore>,
        messenger: Arc<dyn Messenger>,
        fetcher: Arc<dyn SourceFetcher>,
        sources: Vec<FeedSource>,
    ) -> Self {
        Self {
            store,
            messenger,
            fetcher,
            sources,
            instant_view: HashMap::new(),
        }
    }

    /// Set the Instant View rule hashes.
    pub fn with_instant_view(mut self, instant_view: HashMap<String, String>) -> Self {
        self.instant_view = instant_view;
        self
    }

    /// Configured sources.
    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    /// Source due at wall-clock `minute`.
    pub fn select_source(&self, minute: u32) -> Option<&FeedSource> {
        if self.sources.is_empty() {
            return None;
        }
        self.sources.get(minute as usize % self.sources.len())
    }

    /// Poll the source due at `now`.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleReport> {
        let source = self
            .select_source(now.minute())
            .ok_or_else(|| RelayError::Validation("no sources configured".to_string()))?;
        self.poll(source).await
    }

    /// Poll the source named `key`.
    pub async fn check_source(&self, key: &str) -> Result<CycleReport> {
        let source = self
            .sources
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| RelayError::NotFound(format!("source '{}'", key)))?;
        self.poll(source).await
    }

    async fn poll(&self, source: &FeedSource) -> Result<CycleReport> {
        debug!("Checking source {}", source.key);

        let result = match &source.kind {
            SourceKind::Feed { url, .. } => self.check_feed(source, url).await,
            SourceKind::Release { repo, title, pin } => {
                self.check_release(source, repo, title, *pin).await
            }
        };

        match result {
            Ok(sent) => {
                info!(source = %source.key, sent, "Relay cycle finished");
                Ok(CycleReport {
                    checked: source.key.clone(),
                    sent,
                })
            }
            Err(e) => {
                match &e {
                    RelayError::Fetch(_) | RelayError::Parse(_) => {
                        warn!(source = %source.key, "Failed to fetch source: {}", e)
                    }
                    _ => error!(source = %source.key, "Relay cycle failed: {}", e),
                }
                Err(e)
            }
        }
    }

    async fn check_feed(&self, source: &FeedSource, url: &str) -> Result<usize> {
        let entries = self.fetcher.fetch_entries(url).await?;

        let prior = match load_entry_ids(self.store.as_ref(), &source.key).await {
            Ok(prior) => prior,
            Err(RelayError::Parse(e)) => {
                warn!("Reseeding source {}: {}", source.key, e);
                None
            }
            Err(e) => return Err(e),
        };

        let delta = compute_new_entries(&entries, prior.as_ref());
        if delta.changed {
            if let Some(record) = &delta.record {
                save_entry_ids(self.store.as_ref(), &source.key, record).await?;
            }
        }

        if prior.is_none() && delta.changed {
            info!("Seeded source {} with {} entries", source.key, entries.len());
        }

        let mut sent = 0;
        for entry in &delta.new_entries {
            let link = source.display_link(&entry.link);
            let message = format_entry(entry, &link, &self.instant_view);
            self.messenger
                .send_message(&message.text, &message.options)
                .await?;
            sent += 1;
        }
        Ok(sent)
    }

    async fn check_release(
        &self,
        source: &FeedSource,
        repo: &str,
        title: &str,
        pin: bool,
    ) -> Result<usize> {
        let release = self.fetcher.fetch_latest_release(repo).await?;
        let prior = load_release_id(self.store.as_ref(), &source.key).await?;

        let delta = compute_new_release(prior, &release);
        if delta.changed(prior) {
            save_release_id(self.store.as_ref(), &source.key, delta.updated_id).await?;
        }
        if !delta.is_new {
            return Ok(0);
        }

        let message = format_release(title, &release);
        let sent = self
            .messenger
            .send_message(&message.text, &message.options)
            .await?;

        if pin {
            self.rotate_pin(&source.key, sent.message_id).await;
        }
        Ok(1)
    }

    /// Unpin the previously pinned release message and pin `message_id`.
    /// Failures here never fail the cycle: the release was already sent.
    async fn rotate_pin(&self, key: &str, message_id: i64) {
        let previous = match load_pinned_message(self.store.as_ref(), key).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Failed to load pinned message of {}: {}", key, e);
                None
            }
        };

        if let Some(previous) = previous {
            if let Err(e) = self.messenger.unpin_message(previous).await {
                warn!("Failed to unpin message {} of {}: {}", previous, key, e);
            }
        }

        if let Err(e) = self.messenger.pin_message(message_id, true).await {
            error!("Failed to pin message {} of {}: {}", message_id, key, e);
            return;
        }

        if let Err(e) = save_pinned_message(self.store.as_ref(), key, message_id).await {
            error!("Failed to save pinned message of {}: {}", key, e);
        }
    }

    /// Post an incident report. Payloads without an incident are ignored.
    pub async fn relay_incident(&self, payload: &StatusPayload) -> Result<Option<SentMessage>> {
        let Some(incident) = &payload.incident else {
            debug!("Status payload without incident ignored");
            return Ok(None);
        };

        let message = format_incident(incident);
        let sent = self
            .messenger
            .send_message(&message.text, &message.options)
            .await?;
        info!("Relayed incident '{}' ({})", incident.name, incident.status);
        Ok(Some(sent))
    }
}
