//! Schema migrations keyed on `PRAGMA user_version`.
//!
//! # Responsibility
//! - Hold the ordered list of schema steps shipped with this binary.
//! - Bring a connection up to the newest step inside one transaction.
//! - Report where a connection's schema stands relative to this binary.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - `PRAGMA user_version` always equals the last step applied.
//! - Steps tolerate stores created before version tracking existed
//!   (`IF NOT EXISTS` DDL, `typeof` guards on data rewrites).

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "posts_topics",
        sql: include_str!("0001_posts_topics.sql"),
    },
    Step {
        version: 2,
        name: "epoch_timestamps",
        sql: include_str!("0002_epoch_timestamps.sql"),
    },
];

/// Where a connection's schema stands relative to this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Every known step is applied.
    Current,
    /// Steps after `version` are still pending.
    Behind { version: u32 },
    /// Written by a newer binary; `version` is unknown here.
    Ahead { version: u32 },
}

/// Returns the newest schema version this binary can produce.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads `PRAGMA user_version` and classifies it against [`latest_version`].
pub fn schema_status(conn: &Connection) -> rusqlite::Result<SchemaStatus> {
    let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    Ok(match version {
        v if v == latest => SchemaStatus::Current,
        v if v < latest => SchemaStatus::Behind { version: v },
        v => SchemaStatus::Ahead { version: v },
    })
}

/// Applies every pending step, or fails when the store is newer than this binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = match schema_status(conn)? {
        SchemaStatus::Current => return Ok(()),
        SchemaStatus::Ahead { version } => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: version,
                latest_supported: latest_version(),
            })
        }
        SchemaStatus::Behind { version } => version,
    };

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > from_version) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version,
        latest_version()
    );
    Ok(())
}
