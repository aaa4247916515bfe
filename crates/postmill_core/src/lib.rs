//! Persistence layer for generated blog posts.
//! Stores posts, tracks the topic pool and gates how often a post may be
//! generated.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GenerationInterval, StoreConfig};
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::post::{NewPost, Post, PostId, PostSummary};
pub use model::topic::{Topic, TopicId};
pub use repo::post_repo::{PostListQuery, PostRepository, SqlitePostRepository};
pub use repo::topic_repo::{SqliteTopicRepository, TopicRepository};
pub use repo::{RepoError, RepoResult};
pub use service::post_store::PostStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
