//! Post store facade used by the generation workflow and presentation layer.
//!
//! # Responsibility
//! - Expose narrow post/topic operations over the SQLite store.
//! - Seed the topic pool on first initialization.
//! - Answer whether a new post may be generated yet.
//!
//! # Invariants
//! - Every operation opens its own connection and drops it before returning;
//!   no transaction spans two operations.
//! - `get_next_topic` + `mark_topic_used` can hand the same topic to two
//!   concurrent callers. `claim_next_topic` cannot.
//! - Not-found conditions are `None`/empty results.

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::db::open_db;
use crate::model::post::{NewPost, Post, PostId, PostSummary};
use crate::model::topic::{Topic, TopicId};
use crate::repo::post_repo::{PostListQuery, PostRepository, SqlitePostRepository};
use crate::repo::topic_repo::{SqliteTopicRepository, TopicRepository};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::Connection;

/// Facade over the `posts` / `topics` store.
pub struct PostStore<C: Clock = SystemClock> {
    config: StoreConfig,
    clock: C,
}

impl PostStore<SystemClock> {
    /// Creates a store that stamps rows with wall-clock time.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> PostStore<C> {
    /// Creates a store with a caller-provided time source.
    pub fn with_clock(config: StoreConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates schema and indexes when absent and seeds the topic pool when
    /// the `topics` table is empty.
    ///
    /// Safe to call on every startup. Returns the number of topics inserted.
    pub fn initialize(&self) -> RepoResult<usize> {
        let mut conn = self.connect()?;
        let mut topics = SqliteTopicRepository::try_new(&mut conn)?;

        let existing = topics.count_topics()?;
        let inserted = if existing == 0 && !self.config.topics.is_empty() {
            let inserted = topics.seed_topics(&self.config.topics)?;
            info!(
                "event=topic_seed module=store status=ok configured={} inserted={}",
                self.config.topics.len(),
                inserted
            );
            inserted
        } else {
            0
        };

        info!(
            "event=store_init module=store status=ok db_path={} existing_topics={} testing_mode={}",
            self.config.db_path.display(),
            existing,
            self.config.testing_mode
        );
        Ok(inserted)
    }

    /// Returns one random unused topic without marking it.
    pub fn get_next_topic(&self) -> RepoResult<Option<Topic>> {
        let mut conn = self.connect()?;
        let topics = SqliteTopicRepository::try_new(&mut conn)?;
        topics.random_unused()
    }

    /// Marks a topic used now. Unknown ids are a silent no-op.
    pub fn mark_topic_used(&self, topic_id: TopicId) -> RepoResult<()> {
        let mut conn = self.connect()?;
        let topics = SqliteTopicRepository::try_new(&mut conn)?;
        let changed = topics.mark_used(topic_id, self.clock.now_ms())?;
        info!(
            "event=topic_mark_used module=store status=ok topic_id={} changed={}",
            topic_id, changed
        );
        Ok(())
    }

    /// Picks a random unused topic and marks it used in one transaction.
    pub fn claim_next_topic(&self) -> RepoResult<Option<Topic>> {
        let mut conn = self.connect()?;
        let mut topics = SqliteTopicRepository::try_new(&mut conn)?;
        let claimed = topics.claim_random_unused(self.clock.now_ms())?;
        match &claimed {
            Some(topic) => info!(
                "event=topic_claim module=store status=ok topic_id={}",
                topic.id
            ),
            None => info!("event=topic_claim module=store status=ok topic_id=none"),
        }
        Ok(claimed)
    }

    /// Number of topics that can still seed a post.
    pub fn count_unused_topics(&self) -> RepoResult<u64> {
        let mut conn = self.connect()?;
        let topics = SqliteTopicRepository::try_new(&mut conn)?;
        topics.count_unused()
    }

    /// Inserts a published post stamped with the current instant.
    ///
    /// Fails with `RepoError::UniqueConstraintViolation` when the slug exists.
    pub fn save_post(&self, post: &NewPost<'_>) -> RepoResult<PostId> {
        let conn = self.connect()?;
        let posts = SqlitePostRepository::try_new(&conn)?;

        match posts.insert_post(post, self.clock.now_ms()) {
            Ok(id) => {
                info!(
                    "event=post_save module=store status=ok post_id={} slug={}",
                    id, post.slug
                );
                Ok(id)
            }
            Err(err) => {
                let error_code = match &err {
                    RepoError::UniqueConstraintViolation { .. } => "slug_conflict",
                    _ => "db_error",
                };
                warn!(
                    "event=post_save module=store status=error slug={} error_code={}",
                    post.slug, error_code
                );
                Err(err)
            }
        }
    }

    /// Published posts, most recent first.
    pub fn get_recent_posts(&self, limit: u32, offset: u32) -> RepoResult<Vec<PostSummary>> {
        let conn = self.connect()?;
        let posts = SqlitePostRepository::try_new(&conn)?;
        posts.list_recent(&PostListQuery {
            limit: Some(limit),
            offset,
        })
    }

    pub fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let conn = self.connect()?;
        let posts = SqlitePostRepository::try_new(&conn)?;
        posts.get_by_slug(slug)
    }

    /// Count of published posts.
    pub fn get_total_posts(&self) -> RepoResult<u64> {
        let conn = self.connect()?;
        let posts = SqlitePostRepository::try_new(&conn)?;
        posts.count_published()
    }

    /// Whether enough time has passed since the newest post.
    ///
    /// True when the store holds no posts at all.
    pub fn can_generate_post(&self) -> RepoResult<bool> {
        Ok(self.next_generation_at()?.is_none())
    }

    /// Epoch ms at which generation opens again, or `None` if it is open now.
    pub fn next_generation_at(&self) -> RepoResult<Option<i64>> {
        let conn = self.connect()?;
        let posts = SqlitePostRepository::try_new(&conn)?;
        let Some(last_created_at) = posts.latest_created_at()? else {
            return Ok(None);
        };

        let opens_at =
            last_created_at.saturating_add(self.config.generation_interval().as_millis());
        if self.clock.now_ms() >= opens_at {
            Ok(None)
        } else {
            Ok(Some(opens_at))
        }
    }

    fn connect(&self) -> RepoResult<Connection> {
        Ok(open_db(&self.config.db_path)?)
    }
}
