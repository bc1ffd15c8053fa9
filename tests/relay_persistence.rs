//! Dispatcher against the durable SQLite store.

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use common::{build_relay, build_relay_with, post, posts, RecordingMessenger, BLOG_URL, DENO_REPO};
use feed_relay::store::{load_pinned_message, load_release_id};
use feed_relay::{Database, Release, SqliteStore};

async fn open_store(dir: &TempDir) -> Arc<SqliteStore> {
    let db = Database::open(dir.path().join("relay.db")).await.unwrap();
    Arc::new(SqliteStore::new(db, "relay"))
}

fn release(id: i64, tag: &str) -> Release {
    Release::new(
        id,
        tag,
        format!("https://github.com/denoland/deno/releases/tag/{tag}"),
    )
}

#[tokio::test]
async fn test_no_duplicates_across_restart() {
    let dir = TempDir::new().unwrap();

    {
        let (relay, messenger, fetcher) = build_relay(open_store(&dir).await);
        fetcher.set_feed(BLOG_URL, posts(3));
        assert_eq!(relay.check_source("blog").await.unwrap().sent, 0);

        fetcher.set_feed(BLOG_URL, posts(4));
        assert_eq!(relay.check_source("blog").await.unwrap().sent, 1);
        assert_eq!(messenger.sent().len(), 1);
    }

    // A new process sees the same history and posts nothing twice
    let (relay, messenger, fetcher) = build_relay(open_store(&dir).await);
    fetcher.set_feed(BLOG_URL, posts(4));
    assert_eq!(relay.check_source("blog").await.unwrap().sent, 0);

    let mut entries = posts(4);
    entries.insert(0, post(5));
    fetcher.set_feed(BLOG_URL, entries);
    assert_eq!(relay.check_source("blog").await.unwrap().sent, 1);
    assert_eq!(
        messenger.sent(),
        vec!["<b>Post 5</b>\n\nhttps://deno.com/blog/post-5".to_string()]
    );
}

#[tokio::test]
async fn test_release_rotation_across_restart() {
    let dir = TempDir::new().unwrap();

    {
        let (relay, messenger, fetcher) = build_relay(open_store(&dir).await);
        fetcher.set_release(DENO_REPO, release(1, "v1.0.0"));
        relay.check_source("release").await.unwrap();

        fetcher.set_release(DENO_REPO, release(2, "v1.1.0"));
        assert_eq!(relay.check_source("release").await.unwrap().sent, 1);
        assert_eq!(messenger.pinned(), vec![1]);
        assert!(messenger.unpinned().is_empty());
    }

    let store = open_store(&dir).await;
    assert_eq!(load_release_id(store.as_ref(), "release").await.unwrap(), Some(2));
    assert_eq!(load_pinned_message(store.as_ref(), "release").await.unwrap(), Some(1));

    let (relay, messenger, fetcher) =
        build_relay_with(store.clone(), RecordingMessenger::starting_at(500));
    fetcher.set_release(DENO_REPO, release(3, "v1.2.0"));
    assert_eq!(relay.check_source("release").await.unwrap().sent, 1);

    // The message pinned by the previous process is the one unpinned
    assert_eq!(messenger.unpinned(), vec![1]);
    assert_eq!(messenger.pinned(), vec![500]);
    assert_eq!(load_pinned_message(store.as_ref(), "release").await.unwrap(), Some(500));
    assert_eq!(load_release_id(store.as_ref(), "release").await.unwrap(), Some(3));
}
