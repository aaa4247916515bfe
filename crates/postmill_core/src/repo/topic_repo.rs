//! Topic pool repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Seed the topic pool with insert-if-absent semantics.
//! - Pick random unused topics and flip them to used.
//!
//! # Invariants
//! - `used` only ever goes from 0 to 1; nothing here resets or deletes topics.
//! - `random_unused` + `mark_used` are two statements with no lock between
//!   them; `claim_random_unused` runs both inside one immediate transaction.

use crate::model::topic::{Topic, TopicId};
use crate::repo::{count_to_u64, ensure_connection_ready, int_to_bool, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const TOPIC_SELECT_SQL: &str = "SELECT id, topic, used, used_at FROM topics";

/// Repository interface for the topic pool.
pub trait TopicRepository {
    /// Counts all topics, used or not.
    fn count_topics(&self) -> RepoResult<u64>;
    /// Counts topics still available.
    fn count_unused(&self) -> RepoResult<u64>;
    /// Inserts each topic unless already present; returns rows inserted.
    fn seed_topics(&mut self, topics: &[String]) -> RepoResult<usize>;
    /// Picks one unused topic uniformly at random without marking it.
    fn random_unused(&self) -> RepoResult<Option<Topic>>;
    /// Marks a topic used at `used_at` (epoch ms); returns whether a row changed.
    fn mark_used(&self, id: TopicId, used_at: i64) -> RepoResult<bool>;
    /// Picks and marks one unused topic atomically.
    fn claim_random_unused(&mut self, used_at: i64) -> RepoResult<Option<Topic>>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["topics"])?;
        Ok(Self { conn })
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn count_topics(&self) -> RepoResult<u64> {
        count(self.conn, "SELECT COUNT(*) FROM topics;")
    }

    fn count_unused(&self) -> RepoResult<u64> {
        count(self.conn, "SELECT COUNT(*) FROM topics WHERE used = 0;")
    }

    fn seed_topics(&mut self, topics: &[String]) -> RepoResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO topics (topic) VALUES (?1);")?;
            for topic in topics {
                inserted += stmt.execute([topic.as_str()])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn random_unused(&self) -> RepoResult<Option<Topic>> {
        select_random_unused(self.conn)
    }

    fn mark_used(&self, id: TopicId, used_at: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE topics SET used = 1, used_at = ?2 WHERE id = ?1;",
            params![id, used_at],
        )?;
        Ok(changed > 0)
    }

    fn claim_random_unused(&mut self, used_at: i64) -> RepoResult<Option<Topic>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(mut topic) = select_random_unused(&tx)? else {
            return Ok(None);
        };

        tx.execute(
            "UPDATE topics SET used = 1, used_at = ?2 WHERE id = ?1 AND used = 0;",
            params![topic.id, used_at],
        )?;
        tx.commit()?;

        topic.used = true;
        topic.used_at = Some(used_at);
        Ok(Some(topic))
    }
}

fn select_random_unused(conn: &Connection) -> RepoResult<Option<Topic>> {
    let raw = conn
        .query_row(
            &format!("{TOPIC_SELECT_SQL} WHERE used = 0 ORDER BY RANDOM() LIMIT 1;"),
            [],
            RawTopicRow::from_row,
        )
        .optional()?;

    raw.map(RawTopicRow::into_topic).transpose()
}

fn count(conn: &Connection, sql: &str) -> RepoResult<u64> {
    let value: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    count_to_u64(value, sql)
}

struct RawTopicRow {
    id: TopicId,
    topic: String,
    used: i64,
    used_at: Option<i64>,
}

impl RawTopicRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            topic: row.get("topic")?,
            used: row.get("used")?,
            used_at: row.get("used_at")?,
        })
    }

    fn into_topic(self) -> RepoResult<Topic> {
        Ok(Topic {
            id: self.id,
            topic: self.topic,
            used: int_to_bool(self.used, "topics.used")?,
            used_at: self.used_at,
        })
    }
}
