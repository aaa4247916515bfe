//! Time source for timestamps and the generation gate.
//!
//! # Responsibility
//! - Provide the current instant in Unix epoch milliseconds.
//! - Allow tests to simulate elapsed time without sleeping.
//!
//! # Invariants
//! - `ManualClock` only moves forward.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of "now" for the store.
pub trait Clock: Send + Sync {
    /// Current instant in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the store.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn at_ms(start_ms: i64) -> Self {
        Self {
            current_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Moves time forward and returns the new instant.
    pub fn advance(&self, by: Duration) -> i64 {
        let step = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        let previous = self
            .current_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(step))
            })
            .unwrap_or_else(|now| now);
        previous.saturating_add(step)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}
