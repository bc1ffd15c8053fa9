//! Feed delta detection.
//!
//! Given a feed's entries (newest first) and the stored ID history, work out
//! which entries have not been relayed yet. The history is the newest
//! [`HISTORY_LEN`] entry IDs of the last poll that produced something new;
//! walking the feed stops at the first ID found in it.
//!
//! Entries without an ID are never emitted and never recorded: there is no
//! way to tell whether they were seen before.

use std::collections::HashSet;

use super::types::{Entry, HISTORY_LEN};

/// Stored ID history of one ordered feed, newest first.
///
/// Never holds more than [`HISTORY_LEN`] IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupRecord {
    ids: Vec<String>,
}

impl DedupRecord {
    /// Build a record from stored IDs, dropping duplicates and anything
    /// beyond the history length.
    pub fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let ids = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .take(HISTORY_LEN)
            .collect();
        Self { ids }
    }

    /// Build a record from the newest identified entries of a feed.
    pub fn from_entries(entries: &[Entry]) -> Self {
        Self::from_ids(entries.iter().filter_map(|e| e.id.clone()))
    }

    /// Stored IDs, newest first.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Whether `id` was seen.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// Number of stored IDs.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no IDs are stored.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Outcome of one delta computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDelta {
    /// Entries to relay, oldest first.
    pub new_entries: Vec<Entry>,
    /// Record to keep for the next poll (`None` while the feed has never
    /// produced an identified entry).
    pub record: Option<DedupRecord>,
    /// Whether `record` differs from the prior record and must be saved.
    pub changed: bool,
}

impl FeedDelta {
    fn unchanged(prior: Option<&DedupRecord>) -> Self {
        Self {
            new_entries: Vec::new(),
            record: prior.cloned(),
            changed: false,
        }
    }
}

/// Compute the entries of `entries` (newest first) not covered by `prior`.
///
/// - No prior record: seed the history from the current entries and emit
///   nothing, so a newly added feed does not flood the channel.
/// - Otherwise walk newest to oldest until a known ID, and emit what came
///   before it in chronological order.
/// - If no known ID is found (history fell out of the feed's window), emit
///   at most [`HISTORY_LEN`] identified entries.
///
/// The record is rebuilt from the current feed only when something new was
/// found; repeated polls of an unchanged feed leave it untouched.
pub fn compute_new_entries(entries: &[Entry], prior: Option<&DedupRecord>) -> FeedDelta {
    if entries.is_empty() {
        return FeedDelta::unchanged(prior);
    }

    let prior = match prior {
        Some(prior) => prior,
        None => {
            let seeded = DedupRecord::from_entries(entries);
            if seeded.is_empty() {
                return FeedDelta::unchanged(None);
            }
            return FeedDelta {
                new_entries: Vec::new(),
                record: Some(seeded),
                changed: true,
            };
        }
    };

    let mut fresh: Vec<&Entry> = Vec::new();
    let mut emitted = HashSet::new();
    let mut hit_known = false;

    for entry in entries {
        let Some(id) = entry.id.as_deref() else {
            continue;
        };
        if prior.contains(id) {
            hit_known = true;
            break;
        }
        if emitted.insert(id) {
            fresh.push(entry);
        }
    }

    if !hit_known {
        fresh.truncate(HISTORY_LEN);
    }

    if fresh.is_empty() {
        return FeedDelta::unchanged(Some(prior));
    }

    let new_entries = fresh.into_iter().rev().cloned().collect();
    let record = DedupRecord::from_entries(entries);
    let changed = &record != prior;

    FeedDelta {
        new_entries,
        record: Some(record),
        changed,
    }
}
