//! Partitions a collection into groups of directly or transitively similar questions.

use crate::{
    record::McqRecord,
    similarity::{QuestionSignature, SimilarityVerdict},
};

/// Groups record indices by similarity.
///
/// `records` is expected in ascending-id order. Each group starts at the
/// lowest unassigned index (its seed), takes every record directly similar
/// to the seed, then keeps rescanning the unassigned records for anything
/// similar to any member until a pass adds nothing. The result is the set of
/// connected components of the similarity relation; member order is seed,
/// direct matches, then closure additions.
#[must_use]
pub fn group_similar(records: &[McqRecord]) -> Vec<Vec<usize>> {
    let signatures: Vec<QuestionSignature> = records
        .iter()
        .map(|record| QuestionSignature::new(&record.question))
        .collect();
    group_signatures(&signatures)
}

/// Same as [`group_similar`] over precomputed signatures.
#[must_use]
pub fn group_signatures(signatures: &[QuestionSignature]) -> Vec<Vec<usize>> {
    let similar = |a: usize, b: usize| {
        SimilarityVerdict::between(&signatures[a], &signatures[b]).is_similar()
    };
    let mut assigned = vec![false; signatures.len()];
    let mut groups = Vec::new();

    for seed in 0..signatures.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut group = vec![seed];

        for candidate in seed + 1..signatures.len() {
            if !assigned[candidate] && similar(seed, candidate) {
                assigned[candidate] = true;
                group.push(candidate);
            }
        }

        loop {
            let mut grew = false;
            for candidate in 0..signatures.len() {
                if assigned[candidate] {
                    continue;
                }
                if group.iter().any(|&member| similar(member, candidate)) {
                    assigned[candidate] = true;
                    group.push(candidate);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        groups.push(group);
    }
    groups
}
