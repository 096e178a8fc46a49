//! Whole-file persistence for the MCQ collection.

use std::{
    collections::HashSet,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{
    error::StoreError,
    ingest::{parse_candidates, CandidateMcq},
    record::McqRecord,
    text::strict_normalize,
};

/// Counts reported after appending pipeline output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendSummary {
    /// Candidates offered.
    pub found: usize,
    /// Candidates skipped as exact re-submissions.
    pub skipped: usize,
    /// Candidates stored.
    pub added: usize,
    /// Collection size after the append.
    pub total: usize,
}

/// JSON file holding the full collection as an array of records.
#[derive(Debug, Clone)]
pub struct McqStore {
    path: PathBuf,
}

impl McqStore {
    /// Creates a store bound to `path`. Nothing is read until [`Self::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the collection file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the whole collection.
    pub fn load(&self) -> Result<Vec<McqRecord>, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_collection(&raw, &self.path)
    }

    /// Like [`Self::load`], but a missing file is an empty collection.
    pub fn load_or_empty(&self) -> Result<Vec<McqRecord>, StoreError> {
        match self.load() {
            Err(StoreError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Replaces the collection file with `records`.
    ///
    /// The JSON is written to a temporary file next to the target and renamed
    /// over it only once fully flushed, so a failure leaves the previous
    /// collection in place.
    pub fn save(&self, records: &[McqRecord]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(records).map_err(StoreError::Serialize)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&body).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path)
            .map_err(|err| write_err(err.error))?;
        Ok(())
    }

    /// Looks up one record by id.
    pub fn get(&self, id: u64) -> Result<Option<McqRecord>, StoreError> {
        Ok(self.load()?.into_iter().find(|record| record.id == id))
    }

    /// Appends pipeline candidates read from `source`.
    ///
    /// Candidates whose strictly normalized question already exists are
    /// skipped; the rest get ids after the current maximum. A missing
    /// collection file is created.
    pub fn append_from_file(&self, source: &Path) -> Result<AppendSummary, StoreError> {
        let raw = fs::read_to_string(source).map_err(|err| StoreError::Read {
            path: source.to_path_buf(),
            source: err,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|err| StoreError::Parse {
            path: source.to_path_buf(),
            source: err,
        })?;
        let candidates = parse_candidates(value).map_err(|err| StoreError::Parse {
            path: source.to_path_buf(),
            source: err,
        })?;
        self.append(candidates)
    }

    /// Appends already-parsed candidates. See [`Self::append_from_file`].
    pub fn append(&self, candidates: Vec<CandidateMcq>) -> Result<AppendSummary, StoreError> {
        let mut records = self.load_or_empty()?;
        let mut seen: HashSet<String> = records
            .iter()
            .map(|record| strict_normalize(&record.question))
            .collect();
        let mut next_id = records.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        let mut summary = AppendSummary {
            found: candidates.len(),
            ..AppendSummary::default()
        };

        for candidate in candidates {
            if !seen.insert(strict_normalize(candidate.question())) {
                summary.skipped += 1;
                continue;
            }
            records.push(candidate.into_record(next_id));
            next_id += 1;
            summary.added += 1;
        }

        summary.total = records.len();
        if summary.added > 0 {
            self.save(&records)?;
        }
        Ok(summary)
    }
}

fn parse_collection(raw: &str, path: &Path) -> Result<Vec<McqRecord>, StoreError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !value.is_array() {
        return Err(StoreError::NotAnArray {
            path: path.to_path_buf(),
        });
    }
    serde_json::from_value(value).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_json(path: &Path, value: &Value) {
        fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = McqStore::new(dir.path().join("out/mcqs.json"));
        let records = vec![
            McqRecord::new(1, "Define osmosis.").with_option("A", "Water movement"),
            McqRecord::new(2, "Define diffusion.").with_explanation("Particles spread out."),
        ];
        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn load_and_save_keep_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mcqs.json");
        let raw = r#"[{"id":1,"question":"Q?","options":{"D":"d","A":"a"},"zeta":1,"alpha":2}]"#;
        fs::write(&path, raw).unwrap();
        let store = McqStore::new(&path);
        let records = store.load().unwrap();
        let labels: Vec<&String> = records[0].option_map().unwrap().keys().collect();
        assert_eq!(labels, vec!["D", "A"]);

        store.save(&records).unwrap();
        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(serde_json::to_string(&saved).unwrap(), raw);
    }

    #[test]
    fn missing_file_is_a_load_failure() {
        let dir = tempdir().unwrap();
        let store = McqStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.load(), Err(StoreError::Read { .. })));
        assert!(store.load_or_empty().unwrap().is_empty());
    }

    #[test]
    fn invalid_json_and_non_arrays_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mcqs.json");
        fs::write(&path, "{ not json").unwrap();
        let store = McqStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
        write_json(&path, &json!({ "id": 1, "question": "q" }));
        assert!(matches!(store.load(), Err(StoreError::NotAnArray { .. })));
        assert!(matches!(store.load_or_empty(), Err(StoreError::NotAnArray { .. })));
    }

    #[test]
    fn failed_save_keeps_previous_collection() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "plain file").unwrap();
        let store = McqStore::new(blocker.join("mcqs.json"));
        let err = store.save(&[McqRecord::new(1, "q")]).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "plain file");
    }

    #[test]
    fn append_assigns_next_ids_and_skips_resubmissions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mcqs.json");
        write_json(
            &path,
            &json!([
                { "id": 3, "question": "Define osmosis.", "options": {} },
                { "id": 8, "question": "Define diffusion.", "options": {} }
            ]),
        );
        let batch = dir.path().join("batch.json");
        write_json(
            &batch,
            &json!({ "mcqs": [
                { "question": "define   OSMOSIS" },
                { "question": "What is active transport?" },
                { "text": "What is active transport" },
                { "question": "Name a carrier protein." }
            ]}),
        );
        let store = McqStore::new(&path);
        let summary = store.append_from_file(&batch).unwrap();
        assert_eq!(
            summary,
            AppendSummary {
                found: 4,
                skipped: 2,
                added: 2,
                total: 4
            }
        );
        let ids: Vec<u64> = store.load().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 8, 9, 10]);
    }

    #[test]
    fn append_creates_missing_collection() {
        let dir = tempdir().unwrap();
        let store = McqStore::new(dir.path().join("new/mcqs.json"));
        let candidates = parse_candidates(json!([{ "question": "First?" }])).unwrap();
        let summary = store.append(candidates).unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(store.get(1).unwrap().unwrap().question, "First?");
        assert!(store.get(2).unwrap().is_none());
    }
}
