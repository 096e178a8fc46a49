use std::{
    fmt,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord};

/// Builder for dedup telemetry sinks.
pub struct DedupTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
}

impl DedupTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            min_level: LogLevel::Info,
        }
    }

    /// Sets the log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the minimum level written.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<DedupTelemetry> {
        let logger = match self.log_path {
            Some(path) => Some(JsonLogger::with_min_level(path, self.min_level)?),
            None => None,
        };
        Ok(DedupTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
                warned: AtomicBool::new(false),
            }),
        })
    }
}

/// Telemetry handle shared by the engine, the store front-end and the CLI.
#[derive(Clone)]
pub struct DedupTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for DedupTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DedupTelemetry")
            .field("module", &self.inner.module)
            .field("enabled", &self.inner.logger.is_some())
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
    warned: AtomicBool,
}

impl DedupTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> DedupTelemetryBuilder {
        DedupTelemetryBuilder::new(module)
    }

    /// A handle that records nothing.
    #[must_use]
    pub fn disabled(module: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                module: module.into(),
                logger: None,
                warned: AtomicBool::new(false),
            }),
        }
    }

    /// Logs structured metadata, returning any write error.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let record = LogRecord::new(&self.inner.module, level, message).with_metadata(metadata);
            logger.log(&record)?;
        }
        Ok(())
    }

    /// Logs without failing the caller. The first write error is reported on
    /// stderr; later ones are dropped.
    pub fn record(&self, level: LogLevel, message: &str, metadata: Value) {
        if let Err(err) = self.log(level, message, metadata) {
            if !self.inner.warned.swap(true, Ordering::Relaxed) {
                eprintln!("telemetry log write failed: {err:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_log_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("dedup.log");
        let telemetry = DedupTelemetry::builder("dedup")
            .log_path(&path)
            .min_level(LogLevel::Info)
            .build()
            .unwrap();
        telemetry.record(LogLevel::Debug, "dedup.pair", json!({ "a": 1, "b": 2 }));
        telemetry
            .log(LogLevel::Info, "dedup.grouped", json!({ "groups": 3 }))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("dedup.grouped"));
        assert!(!content.contains("dedup.pair"));
    }

    #[test]
    fn disabled_handle_is_silent() {
        let telemetry = DedupTelemetry::disabled("dedup");
        assert!(telemetry
            .log(LogLevel::Error, "ignored", json!({}))
            .is_ok());
    }
}
