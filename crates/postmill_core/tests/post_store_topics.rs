use postmill_core::{ManualClock, PostStore, StoreConfig};
use rusqlite::Connection;
use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;

const START_MS: i64 = 1_700_000_000_000;
const SEED: [&str; 4] = [
    "morning routines",
    "stoic journaling",
    "deep work",
    "slow reading",
];

fn store_with_topics(dir: &TempDir, topics: &[&str]) -> (PostStore<ManualClock>, ManualClock) {
    let clock = ManualClock::at_ms(START_MS);
    let config = StoreConfig::new(dir.path().join("posts.sqlite3")).with_topics(topics.iter().copied());
    (PostStore::with_clock(config, clock.clone()), clock)
}

fn topic_rows(store: &PostStore<ManualClock>) -> i64 {
    let conn = Connection::open(&store.config().db_path).unwrap();
    conn.query_row("SELECT COUNT(*) FROM topics;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn initialize_twice_does_not_duplicate_seeded_topics() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &SEED);

    assert_eq!(store.initialize().unwrap(), SEED.len());
    assert_eq!(store.initialize().unwrap(), 0);

    assert_eq!(topic_rows(&store), 4);
    assert_eq!(store.count_unused_topics().unwrap(), 4);
}

#[test]
fn duplicate_config_topics_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &["tea", "coffee", "tea"]);

    assert_eq!(store.initialize().unwrap(), 2);
    assert_eq!(topic_rows(&store), 2);
}

#[test]
fn seeding_only_happens_while_topics_table_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &["tea"]);
    store.initialize().unwrap();

    let grown = PostStore::new(
        StoreConfig::new(store.config().db_path.clone()).with_topics(["tea", "coffee"]),
    );
    assert_eq!(grown.initialize().unwrap(), 0);
    assert_eq!(topic_rows(&store), 1);
}

#[test]
fn empty_pool_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &[]);
    store.initialize().unwrap();

    assert!(store.get_next_topic().unwrap().is_none());
    assert!(store.claim_next_topic().unwrap().is_none());
}

#[test]
fn next_topic_is_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &["only"]);
    store.initialize().unwrap();

    let first = store.get_next_topic().unwrap().unwrap();
    let second = store.get_next_topic().unwrap().unwrap();
    assert_eq!(first, second);
    assert!(first.is_available());
    assert_eq!(first.used_at, None);
}

#[test]
fn draining_with_mark_returns_each_unused_topic_once() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &SEED);
    store.initialize().unwrap();

    let conn = Connection::open(&store.config().db_path).unwrap();
    conn.execute(
        "UPDATE topics SET used = 1, used_at = 0 WHERE topic = 'deep work';",
        [],
    )
    .unwrap();
    drop(conn);

    let mut seen = HashSet::new();
    while let Some(topic) = store.get_next_topic().unwrap() {
        assert!(seen.insert(topic.id), "topic {} returned twice", topic.id);
        assert_ne!(topic.topic, "deep work");
        store.mark_topic_used(topic.id).unwrap();
    }

    assert_eq!(seen.len(), SEED.len() - 1);
    assert_eq!(store.count_unused_topics().unwrap(), 0);
}

#[test]
fn mark_topic_used_stamps_used_at_once() {
    let dir = tempfile::tempdir().unwrap();
    let (store, clock) = store_with_topics(&dir, &["only"]);
    store.initialize().unwrap();

    let topic = store.get_next_topic().unwrap().unwrap();
    clock.advance(Duration::from_secs(10));
    store.mark_topic_used(topic.id).unwrap();

    let conn = Connection::open(&store.config().db_path).unwrap();
    let (used, used_at): (i64, Option<i64>) = conn
        .query_row(
            "SELECT used, used_at FROM topics WHERE id = ?1;",
            [topic.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(used, 1);
    assert_eq!(used_at, Some(START_MS + 10_000));
    assert!(store.get_next_topic().unwrap().is_none());
}

#[test]
fn mark_unknown_topic_is_a_silent_noop() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &["only"]);
    store.initialize().unwrap();

    store.mark_topic_used(9_999).unwrap();
    assert_eq!(store.count_unused_topics().unwrap(), 1);
}

#[test]
fn claim_marks_topics_and_never_repeats() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &SEED);
    store.initialize().unwrap();

    let mut claimed = HashSet::new();
    while let Some(topic) = store.claim_next_topic().unwrap() {
        assert!(topic.used);
        assert_eq!(topic.used_at, Some(START_MS));
        assert!(claimed.insert(topic.topic));
    }

    let expected: HashSet<String> = SEED.iter().map(|topic| topic.to_string()).collect();
    assert_eq!(claimed, expected);
    assert!(store.get_next_topic().unwrap().is_none());
}

#[test]
fn concurrent_claims_hand_out_distinct_topics() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _clock) = store_with_topics(&dir, &SEED);
    store.initialize().unwrap();

    let claimed: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..SEED.len())
            .map(|_| scope.spawn(|| store.claim_next_topic().unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let ids: HashSet<_> = claimed.iter().flatten().map(|topic| topic.id).collect();
    assert_eq!(ids.len(), SEED.len());
    assert_eq!(store.count_unused_topics().unwrap(), 0);
}
