//! Tag index, filter engine, and tag mutations.
//!
//! All mutations act on the full collection, never on a filtered view;
//! persistence is the caller's responsibility (the session persists after
//! every mutation that returns true).

use indexmap::IndexSet;

use crate::model::{Record, RecordId};

/// Union of every record's tags, in first-seen order. Recomputed in full on
/// each collection change; cheap at realistic collection sizes.
pub fn derive_tags(collection: &[Record]) -> IndexSet<String> {
    let mut tags = IndexSet::new();
    for record in collection {
        for tag in &record.tags {
            tags.insert(tag.clone());
        }
    }
    tags
}

/// Filter the collection by the selected tag set.
///
/// Empty selection is the identity. Otherwise a record is visible when its
/// tags intersect the selection (OR across selected tags). Input order is
/// preserved.
pub fn filter_by_tags(collection: &[Record], selected: &IndexSet<String>) -> Vec<Record> {
    if selected.is_empty() {
        return collection.to_vec();
    }
    collection
        .iter()
        .filter(|r| r.tags.iter().any(|t| selected.contains(t)))
        .cloned()
        .collect()
}

/// Append a tag to the record with the given id. The text is trimmed first;
/// empty-after-trim and unknown ids are no-ops. Duplicates are allowed at
/// this layer.
///
/// Returns whether the collection changed.
pub fn add_tag(collection: &mut [Record], id: &RecordId, raw_text: &str) -> bool {
    let text = raw_text.trim();
    if text.is_empty() {
        return false;
    }
    let Some(record) = collection.iter_mut().find(|r| &r.id == id) else {
        return false;
    };
    record.tags.push(text.to_string());
    true
}

/// Remove every occurrence of `tag` (exact string match) from the record
/// with the given id. Unknown id or absent tag are no-ops.
///
/// Returns whether the collection changed.
pub fn remove_tag(collection: &mut [Record], id: &RecordId, tag: &str) -> bool {
    let Some(record) = collection.iter_mut().find(|r| &r.id == id) else {
        return false;
    };
    let before = record.tags.len();
    record.tags.retain(|t| t != tag);
    record.tags.len() != before
}
