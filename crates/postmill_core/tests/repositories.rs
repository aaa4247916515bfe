use postmill_core::db::migrations::latest_version;
use postmill_core::db::open_db_in_memory;
use postmill_core::{
    NewPost, PostListQuery, PostRepository, RepoError, SqlitePostRepository,
    SqliteTopicRepository, TopicRepository,
};
use rusqlite::Connection;

#[test]
fn post_repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqlitePostRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn topic_repository_rejects_connection_without_topics_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTopicRepository::try_new(&mut conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("topics"))));
}

#[test]
fn list_without_limit_uses_default_page_size() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostRepository::try_new(&conn).unwrap();

    for index in 0..12_i64 {
        let slug = format!("post-{index}");
        repo.insert_post(&NewPost::new("title", &slug, "body"), index)
            .unwrap();
    }

    let page = repo.list_recent(&PostListQuery::default()).unwrap();
    assert_eq!(page.len(), 10);
    assert_eq!(page[0].slug, "post-11");

    let tail = repo
        .list_recent(&PostListQuery {
            limit: None,
            offset: 10,
        })
        .unwrap();
    let slugs: Vec<_> = tail.iter().map(|post| post.slug.as_str()).collect();
    assert_eq!(slugs, ["post-1", "post-0"]);
}

#[test]
fn latest_created_at_tracks_newest_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostRepository::try_new(&conn).unwrap();

    assert_eq!(repo.latest_created_at().unwrap(), None);
    repo.insert_post(&NewPost::new("a", "a", "body"), 5_000).unwrap();
    repo.insert_post(&NewPost::new("b", "b", "body"), 2_000).unwrap();
    assert_eq!(repo.latest_created_at().unwrap(), Some(5_000));
}

#[test]
fn column_default_stamps_rows_inserted_without_created_at() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO posts (slug, title, content) VALUES ('raw', 'Raw', 'body');",
        [],
    )
    .unwrap();

    let repo = SqlitePostRepository::try_new(&conn).unwrap();
    let post = repo.get_by_slug("raw").unwrap().unwrap();
    assert!(post.published);
    assert!(post.created_at > 1_577_836_800_000);
}

#[test]
fn topic_repository_reports_whether_mark_changed_a_row() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTopicRepository::try_new(&mut conn).unwrap();

    let seeded = repo
        .seed_topics(&["a".to_string(), "b".to_string(), "a".to_string()])
        .unwrap();
    assert_eq!(seeded, 2);
    assert_eq!(repo.count_topics().unwrap(), 2);

    let topic = repo.random_unused().unwrap().unwrap();
    assert!(repo.mark_used(topic.id, 1_000).unwrap());
    assert!(!repo.mark_used(-1, 1_000).unwrap());
    assert_eq!(repo.count_unused().unwrap(), 1);
}
