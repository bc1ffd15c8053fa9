//! Ordered feeds: entry type, fetching and delta detection.

pub mod delta;
pub mod fetcher;
pub mod types;

pub use delta::{compute_new_entries, DedupRecord, FeedDelta};
pub use fetcher::{parse_feed, validate_url, HttpFetcher, SourceFetcher};
pub use types::{Entry, HISTORY_LEN, MAX_FEED_SIZE};
