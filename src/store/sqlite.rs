//! SQLite-backed dedup store.

use async_trait::async_trait;

use super::DedupStore;
use crate::db::Database;
use crate::Result;

/// Dedup store persisted in the `dedup_records` table.
///
/// All keys live under one namespace so several relays can share a file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
    namespace: String,
}

impl SqliteStore {
    /// Create a store over `db` using `namespace` as key prefix.
    pub fn new(db: Database, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    /// Namespace this store writes under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl DedupStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM dedup_records WHERE namespace = $1 AND key = $2",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dedup_records (namespace, key, value, updated_at)
            VALUES ($1, $2, $3, datetime('now'))
            ON CONFLICT (namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
