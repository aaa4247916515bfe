//! Post and topic records shared by repositories and the store facade.
//!
//! # Invariants
//! - Identifiers are SQLite surrogate keys assigned on insert.
//! - `Post.topic_used` is a denormalized copy of `Topic.topic`, not a link.

pub mod post;
pub mod topic;
