//! Explanation quality heuristic and explanation merging.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Causal and scientific connectives; any match is worth [`CONNECTIVE_POINTS`] once.
const CONNECTIVES: &[&str] = &[
    "because",
    "therefore",
    "thus",
    "hence",
    "mechanism",
    "process",
    "function",
    "results",
    "causes",
    "leads to",
    "specifically",
    "meaning",
    "refers to",
    "characterized by",
    "known as",
];

const CONNECTIVE_POINTS: u32 = 2;
const STRUCTURE_POINTS: u32 = 1;
const PARENTHESIS_POINTS: u32 = 1;
const CITATION_POINTS: u32 = 2;

/// Sentences at or below this many characters are dropped when merging.
const MIN_SENTENCE_CHARS: usize = 5;

/// Two capitalized words, or a capitalized word followed by `et al.`.
static CITATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+ (?:et al\.|[A-Z][a-z]+\b)").expect("citation pattern")
});

/// Parenthetical spans or citation-like names.
static SCIENTIFIC_TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([^)]+\)|\b[A-Z][a-z]+ (?:et al\.|[A-Z][a-z]+\b)").expect("term pattern")
});

static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence pattern"));

const fn word_band(words: usize) -> u32 {
    match words {
        31.. => 5,
        21..=30 => 4,
        16..=20 => 3,
        11..=15 => 2,
        6..=10 => 1,
        _ => 0,
    }
}

/// Rates an explanation. Absent or blank explanations score 0.
///
/// Typical values fall in 0..=15; the score is not clamped.
#[must_use]
pub fn score_explanation(explanation: Option<&str>) -> u32 {
    let Some(text) = explanation.filter(|text| !text.trim().is_empty()) else {
        return 0;
    };

    let mut score = word_band(text.split_whitespace().count());

    let lowered = text.to_lowercase();
    if CONNECTIVES.iter().any(|phrase| lowered.contains(phrase)) {
        score += CONNECTIVE_POINTS;
    }
    if text.contains(':') || text.contains(" - ") {
        score += STRUCTURE_POINTS;
    }
    if text.contains('(') && text.contains(')') {
        score += PARENTHESIS_POINTS;
    }
    if CITATION.is_match(text) {
        score += CITATION_POINTS;
    }
    score
}

/// Synthesizes one explanation from several.
///
/// Empty and repeated inputs are ignored. With a single distinct input that
/// input is returned as-is; with none the result is empty. Otherwise the
/// distinct sentences are joined in first-seen order, followed by one
/// parenthetical listing the scientific terms unless that list already
/// appears verbatim.
#[must_use]
pub fn merge_explanations<'a, I>(explanations: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut unique: IndexSet<&str> = explanations
        .into_iter()
        .filter(|text| !text.is_empty())
        .collect();
    if unique.len() <= 1 {
        return unique.pop().map(str::to_string).unwrap_or_default();
    }

    let mut sentences: IndexSet<&str> = IndexSet::new();
    let mut terms: IndexSet<&str> = IndexSet::new();
    for &text in &unique {
        terms.extend(SCIENTIFIC_TERM.find_iter(text).map(|term| term.as_str()));
        sentences.extend(
            SENTENCE_BREAK
                .split(text)
                .map(str::trim)
                .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS),
        );
    }

    let mut merged = format!("{}.", join(&sentences, ". "));
    if !terms.is_empty() {
        let joined = join(&terms, ", ");
        if !merged.contains(&joined) {
            merged.push_str(&format!(" ({joined})"));
        }
    }
    merged
}

fn join(parts: &IndexSet<&str>, separator: &str) -> String {
    parts.iter().copied().collect::<Vec<_>>().join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADULA: &str = "The radula is a chitinous structure used for feeding, characterized by rasp-like projections (Mollusca).";

    #[test]
    fn absent_and_empty_score_zero() {
        assert_eq!(score_explanation(None), 0);
        assert_eq!(score_explanation(Some("")), 0);
        assert_eq!(score_explanation(Some("   ")), 0);
    }

    #[test]
    fn short_answer_scores_low() {
        assert_eq!(score_explanation(Some("It is B.")), 0);
    }

    #[test]
    fn detailed_explanation_scores_high() {
        // 15 words (+2), connective (+2), parenthesis (+1).
        assert_eq!(score_explanation(Some(RADULA)), 5);
    }

    #[test]
    fn word_bands_are_exclusive() {
        let words = |n: usize| vec!["word"; n].join(" ");
        assert_eq!(score_explanation(Some(&words(5))), 0);
        assert_eq!(score_explanation(Some(&words(6))), 1);
        assert_eq!(score_explanation(Some(&words(11))), 2);
        assert_eq!(score_explanation(Some(&words(16))), 3);
        assert_eq!(score_explanation(Some(&words(21))), 4);
        assert_eq!(score_explanation(Some(&words(31))), 5);
    }

    #[test]
    fn connective_awarded_once() {
        let one = score_explanation(Some("Water moves because of osmosis"));
        let many = score_explanation(Some("Water moves because of osmosis therefore hence"));
        assert_eq!(one, 2);
        assert_eq!(many, 3);
    }

    #[test]
    fn appending_connective_never_decreases_score() {
        for base in ["", "Short", "Cells divide quickly in tissue", RADULA] {
            let before = score_explanation(Some(base));
            let after = score_explanation(Some(&format!("{base} because")));
            assert!(after >= before, "{base:?}: {after} < {before}");
        }
    }

    #[test]
    fn structure_and_citation_markers() {
        assert_eq!(score_explanation(Some("Key: yes")), 1);
        assert_eq!(score_explanation(Some("yes - no")), 1);
        assert_eq!(score_explanation(Some("Described by Charles Darwin")), 2);
        // Six words (+1) and a citation (+2).
        assert_eq!(score_explanation(Some("Reported by Smith et al. later")), 3);
    }

    #[test]
    fn merge_with_single_distinct_input_returns_it() {
        assert_eq!(merge_explanations(["Same text.", "Same text.", ""]), "Same text.");
        assert_eq!(merge_explanations(Vec::<&str>::new()), "");
    }

    #[test]
    fn merge_collects_distinct_sentences_in_order() {
        let merged = merge_explanations([
            "Osmosis moves water. It needs a membrane!",
            "Osmosis moves water. Solutes stay behind?",
        ]);
        assert_eq!(
            merged,
            "Osmosis moves water. It needs a membrane. Solutes stay behind."
        );
    }

    #[test]
    fn merge_appends_missing_scientific_terms() {
        let merged = merge_explanations([
            "Described first by Charles Darwin in his notes.",
            "The finches (Geospiza) vary in beak shape.",
        ]);
        assert_eq!(
            merged,
            "Described first by Charles Darwin in his notes. The finches (Geospiza) vary in beak shape. (Charles Darwin, (Geospiza))"
        );
    }

    #[test]
    fn merge_keeps_terms_already_present() {
        let merged = merge_explanations(["It is B.", RADULA]);
        assert!(merged.contains("(Mollusca)"));
        assert_eq!(merged.matches("(Mollusca)").count(), 1);
    }
}
