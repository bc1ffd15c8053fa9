//! Feed entry types.

use chrono::{DateTime, Utc};

/// Number of entry IDs remembered per feed.
pub const HISTORY_LEN: usize = 12;

/// Maximum feed size in bytes (5MB).
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// One item of an ordered feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Feed-supplied identifier (RSS guid or Atom id). Absent when the
    /// feed does not provide one.
    pub id: Option<String>,
    /// Entry title.
    pub title: Option<String>,
    /// Link to the entry; falls back to the ID.
    pub link: String,
    /// When the entry was published.
    pub published_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create an entry with an ID, using the ID as link.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            link: id.clone(),
            id: Some(id),
            title: None,
            published_at: None,
        }
    }

    /// Create an entry without an ID.
    pub fn without_id(link: impl Into<String>) -> Self {
        Self {
            id: None,
            title: None,
            link: link.into(),
            published_at: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Set the published date.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Title for display, empty when absent.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}
