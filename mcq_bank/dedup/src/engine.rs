//! Dedup runs: load, cluster, collapse, renumber, persist.

use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    cluster::group_signatures,
    error::StoreError,
    explanation::score_explanation,
    record::McqRecord,
    renumber::renumber,
    select::resolve_group,
    similarity::{QuestionSignature, SimilarityVerdict},
    store::McqStore,
    telemetry::DedupTelemetry,
};

/// One group member as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    /// Record id before renumbering.
    pub id: u64,
    /// Full question text; renderers truncate it.
    pub question: String,
    /// Explanation score of the member as loaded.
    pub explanation_score: u32,
    /// Combined similarity to the group seed in percent; `None` for the seed.
    pub similarity_to_seed: Option<i64>,
}

/// A multi-member group found in preview mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewGroup {
    /// Members in group order, seed first.
    pub members: Vec<MemberSummary>,
}

/// Result of a preview: what a run would remove, without touching the collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewReport {
    /// Records in the collection.
    pub total: usize,
    /// Groups with more than one member.
    pub groups: Vec<PreviewGroup>,
    /// Records a run would discard.
    pub duplicate_count: usize,
}

impl PreviewReport {
    /// Collection size after a run.
    #[must_use]
    pub const fn estimated_final_count(&self) -> usize {
        self.total - self.duplicate_count
    }
}

/// A collapsed multi-member group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    /// Members in group order.
    pub members: Vec<MemberSummary>,
    /// Original id of the surviving record.
    pub kept_id: u64,
    /// Explanation score of the survivor after any merge.
    pub kept_score: u32,
}

/// A discarded duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedRecord {
    /// Original id.
    pub id: u64,
    /// Question text.
    pub question: String,
}

/// A survivor whose explanation was replaced by a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedExplanation {
    /// Original id of the survivor.
    pub kept_id: u64,
    /// Original ids of every group member.
    pub from_ids: Vec<u64>,
}

/// Everything a run reports to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Records before the run.
    pub initial_count: usize,
    /// Number of groups, equal to the final count.
    pub group_count: usize,
    /// Groups with more than one member.
    pub groups: Vec<ResolvedGroup>,
    /// Discarded records.
    pub removed: Vec<RemovedRecord>,
    /// Survivors with merged explanations.
    pub merged: Vec<MergedExplanation>,
    /// Records after the run.
    pub final_count: usize,
    /// Mean explanation length in words over the survivors, rounded.
    pub average_explanation_words: usize,
    /// Survivors carrying an explanation.
    pub with_explanation: usize,
}

impl RunReport {
    /// Number of records removed.
    #[must_use]
    pub const fn removed_count(&self) -> usize {
        self.initial_count - self.final_count
    }
}

/// Deduplicated collection plus its report.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    /// Survivors with ids `1..=N`.
    pub records: Vec<McqRecord>,
    /// Operator report.
    pub report: RunReport,
}

/// Entry point for preview and run modes.
#[derive(Debug, Clone)]
pub struct DedupEngine {
    merge_explanations: bool,
    telemetry: DedupTelemetry,
}

impl Default for DedupEngine {
    fn default() -> Self {
        Self::new()
    }
}

struct Grouping {
    records: Vec<McqRecord>,
    signatures: Vec<QuestionSignature>,
    groups: Vec<Vec<usize>>,
}

impl Grouping {
    fn build(mut records: Vec<McqRecord>) -> Self {
        records.sort_by_key(|record| record.id);
        let signatures: Vec<QuestionSignature> = records
            .iter()
            .map(|record| QuestionSignature::new(&record.question))
            .collect();
        let groups = group_signatures(&signatures);
        Self {
            records,
            signatures,
            groups,
        }
    }

    fn summarize(&self, group: &[usize]) -> Vec<MemberSummary> {
        let seed = group[0];
        group
            .iter()
            .map(|&idx| {
                let record = &self.records[idx];
                MemberSummary {
                    id: record.id,
                    question: record.question.clone(),
                    explanation_score: score_explanation(record.explanation_str()),
                    similarity_to_seed: (idx != seed).then(|| {
                        SimilarityVerdict::between(&self.signatures[seed], &self.signatures[idx])
                            .combined_percent()
                    }),
                }
            })
            .collect()
    }
}

impl DedupEngine {
    /// Engine that merges explanations and records no telemetry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            merge_explanations: true,
            telemetry: DedupTelemetry::disabled("dedup"),
        }
    }

    /// Enables or disables explanation merging.
    #[must_use]
    pub const fn with_merge_explanations(mut self, merge: bool) -> Self {
        self.merge_explanations = merge;
        self
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: DedupTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Clusters the collection and reports duplicate groups.
    #[must_use]
    pub fn preview(&self, records: Vec<McqRecord>) -> PreviewReport {
        let grouping = Grouping::build(records);
        let groups: Vec<PreviewGroup> = grouping
            .groups
            .iter()
            .filter(|group| group.len() > 1)
            .map(|group| PreviewGroup {
                members: grouping.summarize(group),
            })
            .collect();
        let duplicate_count = groups.iter().map(|group| group.members.len() - 1).sum();
        self.telemetry.record(
            LogLevel::Info,
            "dedup.previewed",
            json!({
                "total": grouping.records.len(),
                "duplicate_groups": groups.len(),
                "duplicates": duplicate_count,
            }),
        );
        PreviewReport {
            total: grouping.records.len(),
            groups,
            duplicate_count,
        }
    }

    /// Collapses every group to one record and renumbers the survivors.
    #[must_use]
    pub fn run(&self, records: Vec<McqRecord>) -> DedupOutcome {
        let grouping = Grouping::build(records);
        let initial_count = grouping.records.len();
        self.telemetry.record(
            LogLevel::Info,
            "dedup.grouped",
            json!({
                "groups": grouping.groups.len(),
                "potential_duplicates": initial_count - grouping.groups.len(),
            }),
        );

        let summaries: Vec<Option<Vec<MemberSummary>>> = grouping
            .groups
            .iter()
            .map(|group| (group.len() > 1).then(|| grouping.summarize(group)))
            .collect();
        let mut slots: Vec<Option<McqRecord>> = grouping.records.into_iter().map(Some).collect();

        let mut survivors = Vec::with_capacity(grouping.groups.len());
        let mut report = RunReport {
            initial_count,
            group_count: grouping.groups.len(),
            ..RunReport::default()
        };

        for (group, summary) in grouping.groups.iter().zip(summaries) {
            let members: Vec<McqRecord> =
                group.iter().filter_map(|&idx| slots[idx].take()).collect();
            let Some(resolution) = resolve_group(members, self.merge_explanations) else {
                continue;
            };
            if let Some(members) = summary {
                let removed_ids: Vec<u64> = resolution.removed.iter().map(|r| r.id).collect();
                self.telemetry.record(
                    LogLevel::Info,
                    "dedup.group_resolved",
                    json!({
                        "kept": resolution.kept.id,
                        "removed": removed_ids,
                        "merged": resolution.merged_from.is_some(),
                    }),
                );
                report.groups.push(ResolvedGroup {
                    members,
                    kept_id: resolution.kept.id,
                    kept_score: score_explanation(resolution.kept.explanation_str()),
                });
                report
                    .removed
                    .extend(resolution.removed.iter().map(|record| RemovedRecord {
                        id: record.id,
                        question: record.question.clone(),
                    }));
                if let Some(from_ids) = resolution.merged_from {
                    report.merged.push(MergedExplanation {
                        kept_id: resolution.kept.id,
                        from_ids,
                    });
                }
            }
            survivors.push(resolution.kept);
        }

        renumber(&mut survivors);
        report.final_count = survivors.len();
        report.with_explanation = survivors
            .iter()
            .filter(|record| record.explanation_text().is_some())
            .count();
        report.average_explanation_words = average_words(&survivors);

        self.telemetry.record(
            LogLevel::Info,
            "dedup.completed",
            json!({
                "before": report.initial_count,
                "after": report.final_count,
                "removed": report.removed_count(),
            }),
        );
        DedupOutcome {
            records: survivors,
            report,
        }
    }

    /// Loads the collection and previews it. Nothing is written.
    pub fn preview_store(&self, store: &McqStore) -> Result<PreviewReport, StoreError> {
        let records = self.load(store)?;
        Ok(self.preview(records))
    }

    /// Loads, deduplicates and writes back the collection.
    ///
    /// A load failure returns before anything is processed; the collection
    /// is written only after the whole run has completed.
    pub fn run_store(&self, store: &McqStore) -> Result<RunReport, StoreError> {
        let records = self.load(store)?;
        let outcome = self.run(records);
        store.save(&outcome.records)?;
        self.telemetry.record(
            LogLevel::Info,
            "collection.saved",
            json!({ "path": store.path(), "count": outcome.records.len() }),
        );
        Ok(outcome.report)
    }

    fn load(&self, store: &McqStore) -> Result<Vec<McqRecord>, StoreError> {
        let records = store.load()?;
        self.telemetry.record(
            LogLevel::Info,
            "collection.loaded",
            json!({ "path": store.path(), "count": records.len() }),
        );
        Ok(records)
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn average_words(records: &[McqRecord]) -> usize {
    if records.is_empty() {
        return 0;
    }
    let words: usize = records
        .iter()
        .filter_map(McqRecord::explanation_str)
        .map(|text| text.split_whitespace().count())
        .sum();
    (words as f64 / records.len() as f64).round() as usize
}
