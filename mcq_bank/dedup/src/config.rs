//! Operator settings, loaded from an optional TOML file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared_logging::LogLevel;

use crate::error::ConfigError;

/// Operator settings for dedup runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Collection file.
    pub collection_path: PathBuf,
    /// JSON-lines log file; logging is off when unset.
    pub log_path: Option<PathBuf>,
    /// Minimum level written to the log.
    #[serde(deserialize_with = "deserialize_level")]
    pub log_level: LogLevel,
    /// Whether duplicate groups fold their explanations into the survivor.
    pub merge_explanations: bool,
    /// Question preview width in preview mode.
    pub preview_chars: usize,
    /// Question preview width in run mode.
    pub run_preview_chars: usize,
    /// Question preview width in the removed-duplicates summary.
    pub removed_preview_chars: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            collection_path: PathBuf::from("output/mcqs.json"),
            log_path: None,
            log_level: LogLevel::Info,
            merge_explanations: true,
            preview_chars: 80,
            run_preview_chars: 60,
            removed_preview_chars: 70,
        }
    }
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl DedupConfig {
    /// Loads settings from a TOML file. Relative paths resolve against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.collection_path = resolve(base, &config.collection_path);
        config.log_path = config.log_path.map(|log| resolve(base, &log));
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero-width previews.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("preview_chars", self.preview_chars),
            ("run_preview_chars", self.run_preview_chars),
            ("removed_preview_chars", self.removed_preview_chars),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }
}

fn resolve(base: &Path, candidate: &Path) -> PathBuf {
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dedup.toml");
        fs::write(&path, "").unwrap();
        let config = DedupConfig::load(&path).unwrap();
        assert_eq!(config.collection_path, dir.path().join("output/mcqs.json"));
        assert!(config.merge_explanations);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.preview_chars, 80);
    }

    #[test]
    fn reads_overrides_and_resolves_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dedup.toml");
        fs::write(
            &path,
            r#"
collection_path = "data/bank.json"
log_path = "/var/log/mcq.jsonl"
log_level = "warn"
merge_explanations = false
run_preview_chars = 40
"#,
        )
        .unwrap();
        let config = DedupConfig::load(&path).unwrap();
        assert_eq!(config.collection_path, dir.path().join("data/bank.json"));
        assert_eq!(config.log_path, Some(PathBuf::from("/var/log/mcq.jsonl")));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(!config.merge_explanations);
        assert_eq!(config.run_preview_chars, 40);
        assert_eq!(config.removed_preview_chars, 70);
    }

    #[test]
    fn rejects_zero_width_and_bad_levels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dedup.toml");
        fs::write(&path, "preview_chars = 0\n").unwrap();
        assert!(matches!(
            DedupConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
        fs::write(&path, "log_level = \"chatty\"\n").unwrap();
        assert!(matches!(
            DedupConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            DedupConfig::load(dir.path().join("nope.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
