//! Persisted dedup store.
//!
//! The store is a plain key-value contract; values are JSON text. Typed
//! helpers in [`records`] encode the three record shapes the relay keeps:
//! an entry-ID history per feed, a last release ID per release source and
//! a pinned-message pointer.

mod memory;
pub mod records;
mod sqlite;

pub use memory::MemoryStore;
pub use records::{
    load_entry_ids, load_pinned_message, load_release_id, pin_key, save_entry_ids,
    save_pinned_message, save_release_id,
};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::Result;

/// Durable key-value store for dedup records.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
