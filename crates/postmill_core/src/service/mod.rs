//! Core use-case services.
//!
//! # Responsibility
//! - Own connection lifetimes and orchestrate repository calls.
//! - Keep callers decoupled from SQLite details.

pub mod post_store;
