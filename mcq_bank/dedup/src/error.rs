//! Error types for collection storage and configuration.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while reading or writing a collection file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The collection file could not be read.
    #[error("reading collection {}", .path.display())]
    Read {
        /// Collection path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file is not valid JSON or a record does not match the schema.
    #[error("parsing {}", .path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The top-level JSON value is not an array of records.
    #[error("{} does not hold an array of MCQ records", .path.display())]
    NotAnArray {
        /// Offending file.
        path: PathBuf,
    },
    /// The collection could not be written completely.
    #[error("writing collection {}", .path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Records could not be serialized.
    #[error("serializing collection")]
    Serialize(#[source] serde_json::Error),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("reading config {}", .path.display())]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The config file is not valid TOML for this schema.
    #[error("parsing config {}", .path.display())]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
