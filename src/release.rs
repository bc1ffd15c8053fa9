//! Single-latest-release sources.
//!
//! A release source has no ordered history; the relay only remembers the ID
//! of the last release it processed and compares by identity.

use serde::Deserialize;

use crate::{RelayError, Result};

/// Latest release as returned by the GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Numeric release ID.
    pub id: i64,
    /// Release name; GitHub sends `null` for untitled releases.
    #[serde(default)]
    pub name: Option<String>,
    /// Tag the release points at.
    #[serde(default)]
    pub tag_name: Option<String>,
    /// Release page URL.
    pub html_url: String,
}

impl Release {
    /// Create a release.
    pub fn new(id: i64, name: impl Into<String>, html_url: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            tag_name: None,
            html_url: html_url.into(),
        }
    }

    /// Parse a release from an API response body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| RelayError::Parse(format!("invalid release payload: {}", e)))
    }

    /// Name for display, falling back to the tag.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.tag_name.as_deref())
            .unwrap_or("")
    }
}

/// Outcome of a release comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDelta {
    /// Whether the release should be relayed.
    pub is_new: bool,
    /// Release ID to keep for the next poll.
    pub updated_id: i64,
}

impl ReleaseDelta {
    /// Whether the stored ID has to be written.
    pub fn changed(&self, prior_id: Option<i64>) -> bool {
        prior_id != Some(self.updated_id)
    }
}

/// Compare the current release with the last processed one.
///
/// The first observation only records the ID, so an existing release is
/// not announced when a source is added.
pub fn compute_new_release(prior_id: Option<i64>, current: &Release) -> ReleaseDelta {
    let is_new = matches!(prior_id, Some(prior) if prior != current.id);
    ReleaseDelta {
        is_new,
        updated_id: current.id,
    }
}
