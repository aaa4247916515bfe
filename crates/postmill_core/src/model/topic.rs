//! Topic domain model.
//!
//! # Invariants
//! - `topic` text is unique.
//! - `used` moves from `false` to `true` at most once; `used_at` is set at
//!   that moment and never cleared.

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key for a topic.
pub type TopicId = i64;

/// One entry of the seeded topic pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub topic: String,
    pub used: bool,
    /// Unix epoch milliseconds; `None` while unused.
    pub used_at: Option<i64>,
}

impl Topic {
    /// Returns whether this topic can still seed a post.
    pub fn is_available(&self) -> bool {
        !self.used
    }
}
