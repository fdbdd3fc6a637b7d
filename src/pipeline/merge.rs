//! Identity-based merge of broadcast collections.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::broadcast::BroadcastRecord;

/// Merge freshly fetched records into an existing collection.
///
/// Records are matched on `id`:
/// - within `incoming`, a later record replaces an earlier one with the same
///   id but keeps the earlier one's position;
/// - a record from `existing` is kept only when no incoming record shares
///   its id;
/// - records without an id are never deduplicated.
///
/// The result lists id-keyed records in first-seen order, followed by every
/// record without an id in the order encountered (incoming first).
pub fn merge_broadcasts(
    incoming: Vec<BroadcastRecord>,
    existing: Vec<BroadcastRecord>,
) -> Vec<BroadcastRecord> {
    let mut keyed: Vec<BroadcastRecord> = Vec::with_capacity(incoming.len() + existing.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut anonymous: Vec<BroadcastRecord> = Vec::new();

    for record in incoming {
        let Some(id) = record.id() else {
            anonymous.push(record);
            continue;
        };
        match positions.entry(id) {
            Entry::Occupied(slot) => keyed[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(keyed.len());
                keyed.push(record);
            }
        }
    }

    for record in existing {
        let Some(id) = record.id() else {
            anonymous.push(record);
            continue;
        };
        if let Entry::Vacant(slot) = positions.entry(id) {
            slot.insert(keyed.len());
            keyed.push(record);
        }
    }

    keyed.extend(anonymous);
    keyed
}
