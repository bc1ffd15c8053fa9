//! Database schema and migrations.
//!
//! Migrations run in order; `schema_version` records which have been applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: dedup records, one row per (namespace, source key)
    r#"
CREATE TABLE dedup_records (
    namespace   TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,           -- JSON: ID array, release ID or message ID
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (namespace, key)
);
"#,
];
