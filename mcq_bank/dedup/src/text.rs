//! Canonical forms of question text used by the similarity scorer.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Punctuation and symbols removed before any comparison.
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.,/#!$%^&*;:{}=\-_`~()?"']"#).expect("punctuation pattern"));

/// Articles, prepositions, copulas, demonstratives and domain-neutral qualifiers.
const FILLER_WORDS: &[&str] = &[
    "the", "a", "an", "in", "on", "at", "for", "to", "of", "with", "by", "is", "are", "was",
    "were", "has", "have", "had", "be", "been", "being", "this", "that", "these", "those",
    "which", "what", "who", "whom", "whose", "there", "here", "during", "especially", "typical",
    "primary", "following", "known", "called", "named", "termed",
];

/// Conjunction and pronoun oriented words ignored by the keyword extractor.
const KEYWORD_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "have", "from", "they", "their", "which",
    "what", "during", "especially", "typical", "primary", "following",
];

static FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", FILLER_WORDS.join("|"))).expect("filler pattern")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern"));

fn strip_punctuation(text: &str) -> String {
    PUNCTUATION.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Lower-cases, strips punctuation and filler words, and removes all whitespace.
///
/// `"What is the powerhouse of the cell?"` becomes `"powerhousecell"`.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let stripped = strip_punctuation(text);
    let without_filler = FILLER.replace_all(&stripped, "");
    WHITESPACE.replace_all(&without_filler, "").into_owned()
}

/// Significant tokens of a question: longer than three characters and not a stop word.
///
/// Tokens are split on single spaces after punctuation removal, so the
/// result is a set and repeated words carry no extra weight.
#[must_use]
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    strip_punctuation(text)
        .split(' ')
        .filter(|token| token.chars().count() > 3)
        .filter(|token| !KEYWORD_STOP_WORDS.contains(token))
        .map(ToOwned::to_owned)
        .collect()
}

/// Strict form used to reject exact re-submissions on append: lower-cased,
/// non-word characters removed, whitespace collapsed.
#[must_use]
pub fn strict_normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}
