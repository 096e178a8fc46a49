//! Picks the surviving record of a group and folds in the other members' explanations.

use std::cmp::Ordering;

use crate::{
    explanation::{merge_explanations, score_explanation},
    record::McqRecord,
};

/// Outcome of collapsing one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResolution {
    /// Surviving record, possibly with a merged explanation.
    pub kept: McqRecord,
    /// Discarded members in group order.
    pub removed: Vec<McqRecord>,
    /// Ids of every member when the kept explanation was replaced by a merge.
    pub merged_from: Option<Vec<u64>>,
}

impl GroupResolution {
    /// Whether the group had more than one member.
    #[must_use]
    pub fn is_duplicate_group(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Ranking used to pick a representative: better explanation first, then
/// more options, then the older (lower) id.
fn rank(a: &(u32, &McqRecord), b: &(u32, &McqRecord)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| b.1.option_count().cmp(&a.1.option_count()))
        .then_with(|| a.1.id.cmp(&b.1.id))
}

/// Index of the representative within `group`, or `None` for an empty group.
#[must_use]
pub fn choose_representative(group: &[McqRecord]) -> Option<usize> {
    let mut ranked: Vec<(usize, (u32, &McqRecord))> = group
        .iter()
        .enumerate()
        .map(|(idx, record)| (idx, (score_explanation(record.explanation_str()), record)))
        .collect();
    ranked.sort_by(|a, b| rank(&a.1, &b.1));
    ranked.first().map(|(idx, _)| *idx)
}

/// Collapses a non-empty group to one record.
///
/// Singletons survive unchanged. For larger groups, when at least two
/// members carry a non-blank explanation and `merge` is set, the synthesized
/// explanation replaces the representative's if it is strictly longer.
#[must_use]
pub fn resolve_group(mut group: Vec<McqRecord>, merge: bool) -> Option<GroupResolution> {
    let best = choose_representative(&group)?;
    let member_ids: Vec<u64> = group.iter().map(|record| record.id).collect();

    let merged = if merge && group.len() > 1 {
        let explanations: Vec<&str> = group
            .iter()
            .filter_map(McqRecord::explanation_text)
            .collect();
        (explanations.len() > 1).then(|| merge_explanations(explanations))
    } else {
        None
    };

    let mut kept = group.remove(best);
    let mut merged_from = None;
    if let Some(text) = merged {
        let current = kept.explanation_str().map_or(0, |e| e.chars().count());
        if text.chars().count() > current {
            kept.explanation = Some(text.into());
            merged_from = Some(member_ids);
        }
    }

    Some(GroupResolution {
        kept,
        removed: group,
        merged_from,
    })
}
