//! Lexical similarity between two question texts.
//!
//! Four symmetric signals are computed and OR-ed together; a paraphrase
//! only needs to clear one of them.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::text::{extract_keywords, normalize_text};

/// Weight applied to the keyword overlap in the combined score.
pub const KEYWORD_WEIGHT: f64 = 1.2;
/// Combined-score contribution of a containment match.
pub const CONTAINMENT_SCORE: f64 = 0.9;
/// Weight applied to the positional character agreement in the combined score.
pub const CHAR_WEIGHT: f64 = 1.1;
/// Combined score above which two questions are similar.
pub const COMBINED_THRESHOLD: f64 = 0.65;
/// Keyword overlap above which two questions are similar.
pub const KEYWORD_THRESHOLD: f64 = 0.6;
/// Character agreement above which two questions are similar.
pub const CHAR_THRESHOLD: f64 = 0.7;

/// Precomputed comparison forms of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSignature {
    keywords: BTreeSet<String>,
    normalized: String,
    normalized_chars: Vec<char>,
}

impl QuestionSignature {
    /// Builds the signature of a question.
    #[must_use]
    pub fn new(question: &str) -> Self {
        let normalized = normalize_text(question);
        let normalized_chars = normalized.chars().collect();
        Self {
            keywords: extract_keywords(question),
            normalized,
            normalized_chars,
        }
    }

    /// Keyword set of the question.
    #[must_use]
    pub const fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    /// Normalized form of the question.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Scores from comparing two questions. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityVerdict {
    /// Jaccard overlap of the keyword sets.
    pub keyword_score: f64,
    /// Whether one normalized form contains the other.
    pub contains: bool,
    /// Share of positions where the normalized forms agree.
    pub char_score: f64,
    /// Weighted maximum of the three signals.
    pub combined: f64,
}

impl SimilarityVerdict {
    /// Compares two precomputed signatures.
    #[must_use]
    pub fn between(a: &QuestionSignature, b: &QuestionSignature) -> Self {
        let keyword_score = keyword_overlap(&a.keywords, &b.keywords);
        let contains = contains_either(&a.normalized, &b.normalized);
        let char_score = positional_agreement(&a.normalized_chars, &b.normalized_chars);
        let combined = (keyword_score * KEYWORD_WEIGHT)
            .max(if contains { CONTAINMENT_SCORE } else { 0.0 })
            .max(char_score * CHAR_WEIGHT);
        Self {
            keyword_score,
            contains,
            char_score,
            combined,
        }
    }

    /// Decision rule: any one signal over its threshold is enough.
    #[must_use]
    pub fn is_similar(&self) -> bool {
        self.combined > COMBINED_THRESHOLD
            || self.keyword_score > KEYWORD_THRESHOLD
            || self.contains
            || self.char_score > CHAR_THRESHOLD
    }

    /// Combined score as a rounded percentage.
    #[must_use]
    pub fn combined_percent(&self) -> i64 {
        // Scores are bounded by the weights, far inside i64.
        #[allow(clippy::cast_possible_truncation)]
        let percent = (self.combined * 100.0).round() as i64;
        percent
    }
}

/// Compares two raw question strings.
#[must_use]
pub fn calculate_similarity(q1: &str, q2: &str) -> SimilarityVerdict {
    SimilarityVerdict::between(&QuestionSignature::new(q1), &QuestionSignature::new(q2))
}

/// Whether two raw question strings are near-duplicates.
#[must_use]
pub fn are_similar(q1: &str, q2: &str) -> bool {
    calculate_similarity(q1, q2).is_similar()
}

#[allow(clippy::cast_precision_loss)]
fn keyword_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

// An empty normalized form carries no content, so it neither contains nor
// is contained by anything.
fn contains_either(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

#[allow(clippy::cast_precision_loss)]
fn positional_agreement(a: &[char], b: &[char]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matches as f64 / longest as f64
}
