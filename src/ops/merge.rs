//! Merge engine: reconcile a freshly parsed import against the current
//! collection without losing user-entered tags.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{Record, RecordId};

/// Result of merging a parsed import
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// The import was a sequence; `records` is the new collection in import
    /// order, `skipped` counts elements that did not deserialize (no `id`).
    Merged {
        records: Vec<Record>,
        skipped: usize,
    },
    /// Valid JSON, but the top level was not a sequence. The caller keeps
    /// its current collection and reports a warning.
    NotAnArray,
}

/// Merge a parsed import against the current collection.
///
/// The import is authoritative for everything except tag history: each
/// imported record's tags become the existing record's tags (empty for a new
/// id) followed by the import's own tags. Output order is import order; `seq`
/// is left for the store to reassign on the next write.
///
/// An import that repeats an id collapses to the last occurrence (the id is
/// the store's primary key), keeping the first occurrence's position.
///
/// Importing the same file twice accumulates duplicate tags; that is the
/// contract here, not an accident (dedup, if wanted, is a presentation
/// decision).
pub fn merge_import(raw: &Value, current: &[Record]) -> MergeOutcome {
    let Some(elements) = raw.as_array() else {
        return MergeOutcome::NotAnArray;
    };

    let existing_tags: HashMap<&RecordId, &Vec<String>> =
        current.iter().map(|r| (&r.id, &r.tags)).collect();

    let mut records: IndexMap<RecordId, Record> = IndexMap::with_capacity(elements.len());
    let mut skipped = 0usize;
    for element in elements {
        let Ok(mut record) = serde_json::from_value::<Record>(element.clone()) else {
            skipped += 1;
            continue;
        };
        if let Some(prior) = existing_tags.get(&record.id) {
            let imported = std::mem::take(&mut record.tags);
            record.tags = prior.iter().cloned().chain(imported).collect();
        }
        records.insert(record.id.clone(), record);
    }

    MergeOutcome::Merged {
        records: records.into_values().collect(),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tagged(id: u64, tags: &[&str]) -> Record {
        let mut r = Record::new(RecordId::Int(id));
        r.tags = tags.iter().map(|t| t.to_string()).collect();
        r
    }

    #[test]
    fn non_array_is_rejected() {
        let raw = json!({"not": "an array"});
        assert_eq!(merge_import(&raw, &[]), MergeOutcome::NotAnArray);
        assert_eq!(merge_import(&json!("text"), &[]), MergeOutcome::NotAnArray);
        assert_eq!(merge_import(&json!(3), &[]), MergeOutcome::NotAnArray);
    }

    #[test]
    fn prior_tags_survive_reimport() {
        let current = vec![tagged(1, &["a"])];
        let raw = json!([{"id": 1, "tags": ["b"], "full_text": "updated"}]);

        let MergeOutcome::Merged { records, skipped } = merge_import(&raw, &current) else {
            panic!("expected merge");
        };
        assert_eq!(skipped, 0);
        assert_eq!(records[0].tags, vec!["a", "b"]);
        // Everything but tags comes from the import
        assert_eq!(records[0].full_text, "updated");
    }

    #[test]
    fn import_without_tags_keeps_existing() {
        let current = vec![tagged(1, &["a"])];
        let raw = json!([{"id": 1}]);

        let MergeOutcome::Merged { records, .. } = merge_import(&raw, &current) else {
            panic!("expected merge");
        };
        assert_eq!(records[0].tags, vec!["a"]);
    }

    #[test]
    fn new_ids_take_import_tags_or_none() {
        let raw = json!([{"id": 1, "tags": ["x"]}, {"id": 2}]);

        let MergeOutcome::Merged { records, .. } = merge_import(&raw, &[]) else {
            panic!("expected merge");
        };
        assert_eq!(records[0].tags, vec!["x"]);
        assert!(records[1].tags.is_empty());
    }

    #[test]
    fn output_follows_import_order_and_drops_absent_ids() {
        let current = vec![tagged(1, &[]), tagged(2, &["old"])];
        let raw = json!([{"id": 2}, {"id": 3}]);

        let MergeOutcome::Merged { records, .. } = merge_import(&raw, &current) else {
            panic!("expected merge");
        };
        let ids: Vec<&RecordId> = records.iter().map(|r| &r.id).collect();
        assert_eq!(
            ids,
            vec![&RecordId::Int(2), &RecordId::Int(3)],
            "record 1 is gone, order comes from the import"
        );
        assert_eq!(records[0].tags, vec!["old"]);
    }

    #[test]
    fn repeated_import_accumulates_duplicate_tags() {
        let raw = json!([{"id": 1, "tags": ["a"]}]);
        let MergeOutcome::Merged { records: first, .. } = merge_import(&raw, &[]) else {
            panic!("expected merge");
        };
        let MergeOutcome::Merged {
            records: second, ..
        } = merge_import(&raw, &first)
        else {
            panic!("expected merge");
        };
        assert_eq!(second[0].tags, vec!["a", "a"]);
    }

    #[test]
    fn duplicate_ids_collapse_to_last_occurrence() {
        let raw = json!([
            {"id": 1, "full_text": "first"},
            {"id": 2},
            {"id": 1, "full_text": "second"}
        ]);

        let MergeOutcome::Merged { records, skipped } = merge_import(&raw, &[]) else {
            panic!("expected merge");
        };
        assert_eq!(skipped, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, RecordId::Int(1));
        assert_eq!(records[0].full_text, "second");
    }

    #[test]
    fn elements_without_id_are_skipped_not_fatal() {
        let raw = json!([{"id": 1}, {"full_text": "no id"}, {"id": 2}]);

        let MergeOutcome::Merged { records, skipped } = merge_import(&raw, &[]) else {
            panic!("expected merge");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 1);
    }
}
