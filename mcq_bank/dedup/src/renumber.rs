//! Dense id reassignment after a run.

use crate::record::McqRecord;

/// Sorts survivors by their current id and reassigns ids `1..=N` in that order.
pub fn renumber(records: &mut [McqRecord]) {
    records.sort_by_key(|record| record.id);
    for (record, id) in records.iter_mut().zip(1..) {
        record.id = id;
    }
}
