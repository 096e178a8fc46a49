//! The stored MCQ record.
//!
//! Only `id`, `question` and the explanation feed the dedup heuristics.
//! Everything else is carried as raw JSON, so a record written by any
//! producer keeps its fields and their shapes through a run.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single multiple-choice question as stored in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqRecord {
    /// Collection-unique identifier.
    pub id: u64,
    /// Question text, the key used for similarity comparison.
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    /// Option label to answer text, normally a JSON object. Any other shape
    /// is kept as-is and counts as no options.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Label of the correct option.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Value>,
    /// Explanation; only string values are scored.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Value>,
    /// Passthrough difficulty.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Value>,
    /// Passthrough tags.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    /// Fields written by other producers, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// A field that is present maps to `Some`, even when it is `null`; an absent
// one falls back to the `None` default and is not written back.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl McqRecord {
    /// Creates a record with the given id and question and no options.
    #[must_use]
    pub fn new(id: u64, question: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            options: None,
            correct_answer: None,
            explanation: None,
            difficulty: None,
            tags: None,
            extra: Map::new(),
        }
    }

    /// Adds an option, replacing a non-object `options` value.
    #[must_use]
    pub fn with_option(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        if !matches!(self.options, Some(Value::Object(_))) {
            self.options = Some(Value::Object(Map::new()));
        }
        if let Some(Value::Object(options)) = &mut self.options {
            options.insert(label.into(), Value::String(text.into()));
        }
        self
    }

    /// Sets the explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(Value::String(explanation.into()));
        self
    }

    /// Sets the correct answer label.
    #[must_use]
    pub fn with_answer(mut self, label: impl Into<String>) -> Self {
        self.correct_answer = Some(Value::String(label.into()));
        self
    }

    /// Options as a label map, or `None` when they are missing or not an object.
    #[must_use]
    pub fn option_map(&self) -> Option<&Map<String, Value>> {
        self.options.as_ref().and_then(Value::as_object)
    }

    /// Number of labelled options.
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.option_map().map_or(0, Map::len)
    }

    /// Correct answer label when it is a string.
    #[must_use]
    pub fn answer_label(&self) -> Option<&str> {
        self.correct_answer.as_ref().and_then(Value::as_str)
    }

    /// Raw explanation string, blank or not.
    #[must_use]
    pub fn explanation_str(&self) -> Option<&str> {
        self.explanation.as_ref().and_then(Value::as_str)
    }

    /// Explanation text if it is a non-blank string.
    #[must_use]
    pub fn explanation_text(&self) -> Option<&str> {
        self.explanation_str()
            .filter(|text| !text.trim().is_empty())
    }
}
