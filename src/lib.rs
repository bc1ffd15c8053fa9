//! Feed relay
//!
//! Polls blogs, changelogs and release pages and relays what is new to a
//! Telegram channel, one source per cycle.

pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod format;
pub mod logging;
pub mod relay;
pub mod release;
pub mod source;
pub mod status;
pub mod store;
pub mod telegram;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{RelayError, Result};
pub use feed::{compute_new_entries, DedupRecord, Entry, FeedDelta, HISTORY_LEN};
pub use relay::{CycleReport, Relay, Scheduler};
pub use release::{compute_new_release, Release, ReleaseDelta};
pub use source::{default_sources, FeedSource, LinkRewrite, SourceKind};
pub use store::{DedupStore, MemoryStore, SqliteStore};
pub use telegram::{Messenger, TelegramClient};
