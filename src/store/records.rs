//! Typed record helpers over a [`DedupStore`].

use super::DedupStore;
use crate::feed::DedupRecord;
use crate::{RelayError, Result};

/// Suffix appended to a source key to form its pin pointer key.
pub const PIN_KEY_SUFFIX: &str = "_pin";

/// Store key of the pinned-message pointer for a release source.
pub fn pin_key(source_key: &str) -> String {
    format!("{source_key}{PIN_KEY_SUFFIX}")
}

/// Load the entry-ID history of an ordered feed.
pub async fn load_entry_ids(store: &dyn DedupStore, key: &str) -> Result<Option<DedupRecord>> {
    match store.get(key).await? {
        Some(raw) => {
            let ids: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
                RelayError::Parse(format!("corrupt dedup record for '{}': {}", key, e))
            })?;
            Ok(Some(DedupRecord::from_ids(ids)))
        }
        None => Ok(None),
    }
}

/// Persist the entry-ID history of an ordered feed.
pub async fn save_entry_ids(store: &dyn DedupStore, key: &str, record: &DedupRecord) -> Result<()> {
    let raw = serde_json::to_string(record.ids())?;
    store.set(key, &raw).await
}

async fn load_number(store: &dyn DedupStore, key: &str) -> Result<Option<i64>> {
    match store.get(key).await? {
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            RelayError::Parse(format!("corrupt numeric record for '{}': {}", key, e))
        }),
        None => Ok(None),
    }
}

/// Load the last processed release ID.
pub async fn load_release_id(store: &dyn DedupStore, key: &str) -> Result<Option<i64>> {
    load_number(store, key).await
}

/// Persist the last processed release ID.
pub async fn save_release_id(store: &dyn DedupStore, key: &str, id: i64) -> Result<()> {
    store.set(key, &id.to_string()).await
}

/// Load the message currently pinned for a release source.
pub async fn load_pinned_message(store: &dyn DedupStore, source_key: &str) -> Result<Option<i64>> {
    load_number(store, &pin_key(source_key)).await
}

/// Persist the message currently pinned for a release source.
pub async fn save_pinned_message(
    store: &dyn DedupStore,
    source_key: &str,
    message_id: i64,
) -> Result<()> {
    store.set(&pin_key(source_key), &message_id.to_string()).await
}
