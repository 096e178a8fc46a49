//! Plain-text operator reports for preview and run modes.

use std::fmt;

use crate::{
    config::DedupConfig,
    engine::{MemberSummary, PreviewReport, RunReport},
};

const RULE_WIDTH: usize = 70;

/// Nominal upper end of the explanation score, shown as `n/15`.
pub const SCORE_SCALE: u32 = 15;

/// Question truncation widths used when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    /// Width in preview groups.
    pub preview_chars: usize,
    /// Width in run groups.
    pub run_preview_chars: usize,
    /// Width in the removed-duplicates list.
    pub removed_preview_chars: usize,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self::from(&DedupConfig::default())
    }
}

impl From<&DedupConfig> for ReportStyle {
    fn from(config: &DedupConfig) -> Self {
        Self {
            preview_chars: config.preview_chars,
            run_preview_chars: config.run_preview_chars,
            removed_preview_chars: config.removed_preview_chars,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(f, "{rule}")?;
    writeln!(f, "{title}")?;
    writeln!(f, "{rule}")
}

/// Renders a [`PreviewReport`].
pub struct PreviewDisplay<'a> {
    report: &'a PreviewReport,
    style: ReportStyle,
}

impl PreviewReport {
    /// Displayable form using the given truncation widths.
    #[must_use]
    pub const fn display(&self, style: ReportStyle) -> PreviewDisplay<'_> {
        PreviewDisplay {
            report: self,
            style,
        }
    }
}

impl fmt::Display for PreviewDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        heading(f, "DUPLICATE PREVIEW")?;
        writeln!(f, "Current collection: {} MCQs", report.total)?;
        for group in &report.groups {
            writeln!(f)?;
            writeln!(f, "Group ({} similar MCQs):", group.members.len())?;
            for (position, member) in group.members.iter().enumerate() {
                write_preview_member(f, position + 1, member, self.style.preview_chars)?;
            }
        }
        writeln!(f)?;
        heading(f, "PREVIEW SUMMARY")?;
        writeln!(f, "Total MCQs: {}", report.total)?;
        writeln!(f, "Duplicates to remove: {}", report.duplicate_count)?;
        writeln!(f, "Estimated final count: {}", report.estimated_final_count())?;
        if report.duplicate_count == 0 {
            writeln!(f, "No duplicates found.")?;
        } else {
            writeln!(f, "Use `run` to remove these duplicates.")?;
        }
        Ok(())
    }
}

fn write_preview_member(
    f: &mut fmt::Formatter<'_>,
    position: usize,
    member: &MemberSummary,
    width: usize,
) -> fmt::Result {
    writeln!(f, "   {position}. ID {}:", member.id)?;
    writeln!(f, "      Q: {}", truncate(&member.question, width))?;
    if let Some(percent) = member.similarity_to_seed {
        writeln!(f, "      Similarity: {percent}%")?;
    }
    writeln!(
        f,
        "      Explanation score: {}/{SCORE_SCALE}",
        member.explanation_score
    )
}

/// Renders a [`RunReport`].
pub struct RunDisplay<'a> {
    report: &'a RunReport,
    style: ReportStyle,
}

impl RunReport {
    /// Displayable form using the given truncation widths.
    #[must_use]
    pub const fn display(&self, style: ReportStyle) -> RunDisplay<'_> {
        RunDisplay {
            report: self,
            style,
        }
    }
}

impl fmt::Display for RunDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        heading(f, "MCQ DEDUPLICATION")?;
        writeln!(f, "Initial collection: {} MCQs", report.initial_count)?;
        writeln!(f, "Found {} unique question groups", report.group_count)?;
        writeln!(
            f,
            "Identified {} potential duplicates",
            report.initial_count - report.group_count
        )?;

        for group in &report.groups {
            writeln!(f)?;
            writeln!(f, "Found {} similar MCQs:", group.members.len())?;
            for member in &group.members {
                writeln!(
                    f,
                    "   - ID {}: {}",
                    member.id,
                    truncate(&member.question, self.style.run_preview_chars)
                )?;
                writeln!(
                    f,
                    "     Explanation score: {}/{SCORE_SCALE}",
                    member.explanation_score
                )?;
            }
            writeln!(
                f,
                "   Keeping ID {} (score: {}/{SCORE_SCALE})",
                group.kept_id, group.kept_score
            )?;
        }

        writeln!(f)?;
        heading(f, "DEDUPLICATION SUMMARY")?;
        writeln!(f, "Before: {} MCQs", report.initial_count)?;
        writeln!(f, "After: {} MCQs", report.final_count)?;
        writeln!(f, "Removed: {} duplicates", report.removed_count())?;
        if report.final_count == 0 {
            writeln!(f, "New ID range: none")?;
        } else {
            writeln!(f, "New ID range: 1 - {}", report.final_count)?;
        }

        if !report.removed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Removed duplicates:")?;
            for (position, removed) in report.removed.iter().enumerate() {
                writeln!(
                    f,
                    "   {}. ID {}: {}",
                    position + 1,
                    removed.id,
                    truncate(&removed.question, self.style.removed_preview_chars)
                )?;
            }
        }

        if !report.merged.is_empty() {
            writeln!(f)?;
            writeln!(f, "Enhanced explanations:")?;
            for merged in &report.merged {
                let ids: Vec<String> = merged.from_ids.iter().map(u64::to_string).collect();
                writeln!(
                    f,
                    "   - MCQ #{} (merged from IDs: {})",
                    merged.kept_id,
                    ids.join(", ")
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Quality metrics:")?;
        writeln!(
            f,
            "   - Average explanation length: {} words",
            report.average_explanation_words
        )?;
        writeln!(
            f,
            "   - MCQs with explanations: {}/{}",
            report.with_explanation, report.final_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::DedupEngine, record::McqRecord};

    fn sample() -> Vec<McqRecord> {
        vec![
            McqRecord::new(1, "What is the powerhouse of the cell?")
                .with_explanation("Mitochondria make ATP."),
            McqRecord::new(2, "The organelle known as the powerhouse of the cell is the:")
                .with_explanation("Because respiration happens in mitochondria."),
            McqRecord::new(3, "Name the longest bone in the human body."),
        ]
    }

    #[test]
    fn truncates_long_questions_only() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn preview_lists_members_and_summary() {
        let report = DedupEngine::new().preview(sample());
        let text = report.display(ReportStyle::default()).to_string();
        assert!(text.contains("Group (2 similar MCQs):"));
        assert!(text.contains("   1. ID 1:"));
        assert!(text.contains("Similarity: 90%"));
        assert!(text.contains("Duplicates to remove: 1"));
        assert!(text.contains("Estimated final count: 2"));
    }

    #[test]
    fn preview_without_duplicates_says_so() {
        let report = DedupEngine::new().preview(vec![McqRecord::new(5, "Only question?")]);
        let text = report.display(ReportStyle::default()).to_string();
        assert!(text.contains("No duplicates found."));
        assert!(!text.contains("Group ("));
    }

    #[test]
    fn run_report_lists_kept_removed_and_merged() {
        let outcome = DedupEngine::new().run(sample());
        let style = ReportStyle {
            run_preview_chars: 10,
            ..ReportStyle::default()
        };
        let text = outcome.report.display(style).to_string();
        assert!(text.contains("Keeping ID 2"));
        assert!(text.contains("   - ID 1: What is th..."));
        assert!(text.contains("Removed duplicates:"));
        assert!(text.contains("1. ID 1: What is the powerhouse of the cell?"));
        assert!(text.contains("MCQ #2 (merged from IDs: 1, 2)"));
        assert!(text.contains("New ID range: 1 - 2"));
        assert!(text.contains("MCQs with explanations: 1/2"));
    }

    #[test]
    fn empty_run_report_has_no_id_range() {
        let outcome = DedupEngine::new().run(Vec::new());
        let text = outcome.report.display(ReportStyle::default()).to_string();
        assert!(text.contains("New ID range: none"));
        assert!(text.contains("Average explanation length: 0 words"));
    }
}
