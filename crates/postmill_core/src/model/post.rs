//! Post domain model.
//!
//! # Responsibility
//! - Define the stored post record and its list-view projection.
//! - Define the borrowed insert payload used by `save_post`.
//!
//! # Invariants
//! - `slug` is unique across all posts.
//! - `created_at` is set once on insert and never changes.
//! - Posts are append-only; `published` is never toggled by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key for a post.
pub type PostId = i64;

/// Full post row, as returned by slug lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// URL-safe unique identifier.
    pub slug: String,
    pub title: String,
    pub meta_description: Option<String>,
    /// Primary body.
    pub content: String,
    /// Auxiliary rendered fragment (book recommendations).
    pub books_html: Option<String>,
    /// Text copy of the topic that produced this post. Not a foreign key.
    pub topic_used: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub published: bool,
}

impl Post {
    /// Returns `created_at` as a UTC datetime, or `None` when out of range.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.created_at)
    }
}

/// List-view projection; body fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub slug: String,
    pub title: String,
    pub meta_description: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Insert payload for a new post.
///
/// `created_at` and `published` are not part of the payload: the store
/// assigns the current instant and `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub meta_description: Option<&'a str>,
    pub content: &'a str,
    pub books_html: Option<&'a str>,
    pub topic_used: Option<&'a str>,
}

impl<'a> NewPost<'a> {
    /// Creates a payload with the required fields; optional fields start empty.
    pub fn new(title: &'a str, slug: &'a str, content: &'a str) -> Self {
        Self {
            title,
            slug,
            meta_description: None,
            content,
            books_html: None,
            topic_used: None,
        }
    }

    pub fn with_meta_description(mut self, meta_description: &'a str) -> Self {
        self.meta_description = Some(meta_description);
        self
    }

    pub fn with_books_html(mut self, books_html: &'a str) -> Self {
        self.books_html = Some(books_html);
        self
    }

    pub fn with_topic_used(mut self, topic_used: &'a str) -> Self {
        self.topic_used = Some(topic_used);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{NewPost, Post};

    #[test]
    fn new_post_builder_fills_optional_fields() {
        let payload = NewPost::new("Title", "title", "body")
            .with_meta_description("meta")
            .with_books_html("<ul></ul>")
            .with_topic_used("stoicism");

        assert_eq!(payload.meta_description, Some("meta"));
        assert_eq!(payload.books_html, Some("<ul></ul>"));
        assert_eq!(payload.topic_used, Some("stoicism"));
    }

    #[test]
    fn created_at_utc_converts_epoch_millis() {
        let post = Post {
            id: 1,
            slug: "a".to_string(),
            title: "A".to_string(),
            meta_description: None,
            content: "body".to_string(),
            books_html: None,
            topic_used: None,
            created_at: 1_700_000_000_000,
            published: true,
        };

        let at = post.created_at_utc().expect("timestamp should be in range");
        assert_eq!(at.timestamp(), 1_700_000_000);
    }
}
