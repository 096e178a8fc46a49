//! Standardizes records produced by the extraction pipeline before they are appended.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::record::McqRecord;

const DEFAULT_DIFFICULTY: &str = "medium";

/// A parsed but not yet numbered MCQ, accepting the field aliases the
/// pipeline emits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateMcq {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    options: Option<Value>,
    #[serde(default, rename = "correctAnswer")]
    correct_answer: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    correct_option: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    explanation_text: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

fn first_filled(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
}

impl CandidateMcq {
    /// Question text after alias fallback.
    #[must_use]
    pub fn question(&self) -> &str {
        [&self.question, &self.text]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .map_or("", String::as_str)
    }

    /// Builds the stored record under the given id.
    #[must_use]
    pub fn into_record(self, id: u64) -> McqRecord {
        let question = self.question().to_string();
        McqRecord {
            id,
            question,
            options: Some(
                self.options
                    .unwrap_or_else(|| Value::Object(Map::new())),
            ),
            correct_answer: first_filled([self.correct_answer, self.answer, self.correct_option])
                .map(Value::String),
            explanation: first_filled([self.explanation, self.explanation_text, None])
                .map(Value::String),
            difficulty: Some(Value::String(
                self.difficulty
                    .filter(|value| !value.is_empty())
                    .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            )),
            tags: Some(self.tags.unwrap_or_default().into()),
            extra: Map::new(),
        }
    }
}

/// Reads candidates from a JSON array, an object with an `mcqs` array, or a
/// single candidate object.
pub fn parse_candidates(value: Value) -> Result<Vec<CandidateMcq>, serde_json::Error> {
    match value {
        Value::Array(_) => serde_json::from_value(value),
        Value::Object(mut map) if map.get("mcqs").is_some_and(Value::is_array) => {
            serde_json::from_value(map.remove("mcqs").unwrap_or_default())
        }
        other => serde_json::from_value(other).map(|candidate| vec![candidate]),
    }
}
