//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for posts and topics.
//! - Isolate SQLite query details from the store facade.
//!
//! # Invariants
//! - Repositories only accept connections whose schema is fully migrated.
//! - "Not found" is an empty result, never an error.

use crate::db::migrations::{latest_version, schema_status, SchemaStatus};
use crate::db::DbError;
use rusqlite::Connection;
use thiserror::Error;

pub mod post_repo;
pub mod topic_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for post/topic persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    /// A post with this slug already exists.
    #[error("post slug already exists: `{slug}`")]
    UniqueConstraintViolation { slug: String },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("connection schema version {actual_version} is behind required {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that were not opened through `db::open_db*`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    if let SchemaStatus::Behind { version } = schema_status(conn)? {
        return Err(RepoError::UninitializedConnection {
            expected_version: latest_version(),
            actual_version: version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn count_to_u64(value: i64, query: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` from {query}")))
}
