#![deny(missing_docs, rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Structured JSON-lines logging shared by the MCQ bank tools.

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log severity level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Per-step detail.
    Debug,
    /// Run milestones such as loads, saves and group resolutions.
    Info,
    /// Degraded but recoverable conditions.
    Warn,
    /// Failed commands.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(anyhow!("unknown log level `{other}`")),
        }
    }
}

/// One line of the JSON log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// UTC time the record was created, serialized as RFC 3339.
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    /// Emitting component, e.g. `dedup` or `mcq`.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Dotted event name such as `collection.saved`.
    pub message: String,
    /// Arbitrary JSON payload for counts and ids.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,
}

impl LogRecord {
    /// Stamps a new record with the current time and no metadata.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            level,
            module: module.into(),
            message: event.into(),
            timestamp: Utc::now(),
            metadata: serde_json::Map::default(),
        }
    }

    /// Attaches metadata. Object values are merged key by key; any other
    /// value is stored under `data`.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        match metadata {
            Value::Object(map) => self.metadata.extend(map),
            Value::Null => {}
            other => {
                self.metadata.insert("data".into(), other);
            }
        }
        self
    }
}

/// Appends records to a file, one JSON object per line.
///
/// The file handle sits behind a mutex so clones of a telemetry handle can
/// share one logger; each record is encoded up front and written with a
/// single call so lines never interleave.
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    min_level: LogLevel,
    file: Mutex<File>,
}

impl JsonLogger {
    /// Opens `path` for appending with no level filter.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_min_level(path, LogLevel::Debug)
    }

    /// Opens `path` for appending, creating missing parent directories.
    /// Records below `min_level` are discarded.
    pub fn with_min_level(path: impl AsRef<Path>, min_level: LogLevel) -> Result<Self> {
        let path = path.as_ref();
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?,
            _ => {}
        }
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("opening log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            min_level,
            file: Mutex::new(file),
        })
    }

    /// Appends `record` unless it is below the level filter.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        if record.level < self.min_level {
            return Ok(());
        }
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }

    /// Level filter in effect.
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Log file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
