//! Store configuration.
//!
//! # Responsibility
//! - Describe where the database lives and which topics seed a fresh store.
//! - Select the minimum interval between generated posts.
//!
//! # Invariants
//! - Seed topics are trimmed and never blank.
//! - `testing_mode` only shortens the generation interval.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const TESTING_INTERVAL_SECS: u64 = 5 * 60;
const PRODUCTION_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Configuration load/validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Minimum spacing between two generated posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationInterval {
    /// Five minutes.
    Testing,
    /// One day.
    Production,
}

impl GenerationInterval {
    pub fn as_duration(self) -> Duration {
        match self {
            Self::Testing => Duration::from_secs(TESTING_INTERVAL_SECS),
            Self::Production => Duration::from_secs(PRODUCTION_INTERVAL_SECS),
        }
    }

    pub fn as_millis(self) -> i64 {
        i64::try_from(self.as_duration().as_millis()).unwrap_or(i64::MAX)
    }
}

/// Configuration consumed by `PostStore`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file; created on first open.
    pub db_path: PathBuf,
    /// Selects the short generation interval.
    #[serde(default)]
    pub testing_mode: bool,
    /// Topic pool used only when the `topics` table is empty.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl StoreConfig {
    /// Builds a production-mode config with no seed topics.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            testing_mode: false,
            topics: Vec::new(),
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_testing_mode(mut self, testing_mode: bool) -> Self {
        self.testing_mode = testing_mode;
        self
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validated()
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Trims seed topics and rejects blank entries or an empty db path.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }

        let mut topics = Vec::with_capacity(self.topics.len());
        for (index, topic) in self.topics.iter().enumerate() {
            let trimmed = topic.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "topics[{index}] cannot be blank"
                )));
            }
            topics.push(trimmed.to_string());
        }
        self.topics = topics;

        Ok(self)
    }

    pub fn generation_interval(&self) -> GenerationInterval {
        if self.testing_mode {
            GenerationInterval::Testing
        } else {
            GenerationInterval::Production
        }
    }
}
