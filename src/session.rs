//! The presentation-facing session: owns the in-memory collection, the
//! durable store underneath it, and the selected-tag filter.
//!
//! Writes are optimistic: the in-memory collection updates first (and the UI
//! renders from it immediately), then the durable bulk replace runs. The
//! `Durability` marker makes the gap observable — `Pending` between the
//! in-memory update and a successful `replace_all`, `Committed` after. On a
//! store failure the in-memory collection stays authoritative and the error
//! is surfaced to the operator; `persist` can be retried.

use std::path::Path;

use indexmap::IndexSet;
use serde_json::Value;

use crate::model::{Record, RecordId};
use crate::ops::merge::{MergeOutcome, merge_import};
use crate::ops::tags;
use crate::store::{Store, StoreError};

/// Whether the in-memory collection has reached the durable store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// In-memory and durable views agree
    Committed,
    /// The in-memory collection has changes the store has not confirmed
    Pending,
}

/// What happened to an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The collection was replaced by the merged import
    Imported {
        count: usize,
        /// Elements that did not deserialize (e.g. missing `id`)
        skipped: usize,
    },
    /// Valid JSON but not a sequence; collection unchanged (warning)
    NotAnArray,
}

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not parse import: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("store failure (in-memory collection retained): {0}")]
    Store(#[from] StoreError),
}

/// One interactive session over the vault
pub struct Session {
    store: Store,
    collection: Vec<Record>,
    selected: IndexSet<String>,
    durability: Durability,
}

impl Session {
    /// Open the store at `db_path` and load the persisted collection
    pub fn open(db_path: &Path) -> Result<Self, SessionError> {
        let store = Store::open(db_path)?;
        let collection = store.read_all_ordered()?;
        Ok(Session {
            store,
            collection,
            selected: IndexSet::new(),
            durability: Durability::Committed,
        })
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self, SessionError> {
        let store = Store::open_in_memory()?;
        Ok(Session {
            store,
            collection: Vec::new(),
            selected: IndexSet::new(),
            durability: Durability::Committed,
        })
    }

    // -----------------------------------------------------------------
    // Import / export
    // -----------------------------------------------------------------

    /// Parse raw bytes as a JSON archive and merge it into the collection.
    ///
    /// Malformed JSON is an error and a non-sequence top level is a warning
    /// outcome; the collection is unchanged in both cases.
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<ImportOutcome, SessionError> {
        let raw: Value = serde_json::from_slice(bytes)?;
        match merge_import(&raw, &self.collection) {
            MergeOutcome::NotAnArray => Ok(ImportOutcome::NotAnArray),
            MergeOutcome::Merged { records, skipped } => {
                let count = records.len();
                self.replace_collection(records)?;
                self.store.set_last_import(chrono::Utc::now())?;
                Ok(ImportOutcome::Imported { count, skipped })
            }
        }
    }

    /// Serialize the full collection (not the filtered view) as 2-space
    /// indented JSON.
    pub fn export_json(&self) -> Result<Vec<u8>, SessionError> {
        Ok(serde_json::to_vec_pretty(&self.collection)?)
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    /// The filtered view the presentation renders from
    pub fn current_view(&self) -> Vec<Record> {
        tags::filter_by_tags(&self.collection, &self.selected)
    }

    /// Every distinct tag in use, in first-seen order
    pub fn available_tags(&self) -> IndexSet<String> {
        tags::derive_tags(&self.collection)
    }

    pub fn selected_tags(&self) -> &IndexSet<String> {
        &self.selected
    }

    /// Replace the tag filter. Filtering is in-memory only; nothing is
    /// persisted.
    pub fn set_selected_tags(&mut self, selected: IndexSet<String>) {
        self.selected = selected;
    }

    /// The full collection, unfiltered
    pub fn collection(&self) -> &[Record] {
        &self.collection
    }

    pub fn post_count(&self) -> usize {
        self.collection.len()
    }

    pub fn durability(&self) -> Durability {
        self.durability
    }

    /// Time of the last successful import, if any
    pub fn last_import(&self) -> Result<Option<chrono::DateTime<chrono::Utc>>, SessionError> {
        Ok(self.store.last_import()?)
    }

    // -----------------------------------------------------------------
    // Tag mutations
    // -----------------------------------------------------------------

    /// Append a (trimmed) tag to a record and persist. Returns whether the
    /// collection changed; empty text and unknown ids are no-ops.
    pub fn add_tag(&mut self, id: &RecordId, raw_text: &str) -> Result<bool, SessionError> {
        if !tags::add_tag(&mut self.collection, id, raw_text) {
            return Ok(false);
        }
        self.durability = Durability::Pending;
        self.persist()?;
        Ok(true)
    }

    /// Remove all occurrences of a tag from a record and persist. Unknown id
    /// or absent tag are no-ops.
    pub fn remove_tag(&mut self, id: &RecordId, tag: &str) -> Result<bool, SessionError> {
        if !tags::remove_tag(&mut self.collection, id, tag) {
            return Ok(false);
        }
        self.durability = Durability::Pending;
        self.persist()?;
        Ok(true)
    }

    // -----------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------

    /// Write the in-memory collection through to the store. Public so a
    /// failed write can be retried by the operator.
    pub fn persist(&mut self) -> Result<(), SessionError> {
        self.store.replace_all(&self.collection)?;
        self.durability = Durability::Committed;
        Ok(())
    }

    /// Re-read the collection from the store, discarding the in-memory copy.
    /// Refused while a write is pending: the in-memory collection is the
    /// source of truth until it commits.
    pub fn reload(&mut self) -> Result<bool, SessionError> {
        if self.durability == Durability::Pending {
            return Ok(false);
        }
        self.collection = self.store.read_all_ordered()?;
        Ok(true)
    }

    /// Optimistically install a new collection, then write it through.
    /// `seq` is assigned here the same way the store assigns it, so the
    /// in-memory view is dense even before (or without) the commit.
    fn replace_collection(&mut self, mut records: Vec<Record>) -> Result<(), SessionError> {
        for (i, record) in records.iter_mut().enumerate() {
            record.seq = i;
        }
        self.collection = records;
        self.durability = Durability::Pending;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARCHIVE: &str = r#"[
        {"id": 1, "screen_name": "alice", "full_text": "first", "tags": ["x"]},
        {"id": 2, "screen_name": "bob", "full_text": "second", "tags": ["y"]},
        {"id": 3, "screen_name": "carol", "full_text": "third", "tags": ["x", "y"]}
    ]"#;

    fn loaded_session() -> Session {
        let mut session = Session::open_in_memory().unwrap();
        session.import_bytes(ARCHIVE.as_bytes()).unwrap();
        session
    }

    fn tag_set(tags: &[&str]) -> IndexSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn import_assigns_dense_sequence() {
        let session = loaded_session();
        let seqs: Vec<usize> = session.collection().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(session.durability(), Durability::Committed);
    }

    #[test]
    fn malformed_json_leaves_collection_unchanged() {
        let mut session = loaded_session();
        let before = session.collection().to_vec();
        assert!(matches!(
            session.import_bytes(b"{ not json"),
            Err(SessionError::Parse(_))
        ));
        assert_eq!(session.collection(), &before[..]);
    }

    #[test]
    fn non_array_json_is_a_warning_not_an_error() {
        let mut session = loaded_session();
        let before = session.collection().to_vec();
        let outcome = session.import_bytes(br#"{"not": "an array"}"#).unwrap();
        assert_eq!(outcome, ImportOutcome::NotAnArray);
        assert_eq!(session.collection(), &before[..]);
    }

    #[test]
    fn filter_drives_current_view() {
        let mut session = loaded_session();
        assert_eq!(session.current_view().len(), 3);

        session.set_selected_tags(tag_set(&["x"]));
        let ids: Vec<String> = session
            .current_view()
            .iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);

        session.set_selected_tags(tag_set(&["x", "y"]));
        assert_eq!(session.current_view().len(), 3);

        session.set_selected_tags(IndexSet::new());
        assert_eq!(session.current_view().len(), 3);
    }

    #[test]
    fn available_tags_follow_mutations() {
        let mut session = loaded_session();
        assert_eq!(available(&session), vec!["x", "y"]);
        session.add_tag(&RecordId::Int(2), "z").unwrap();
        assert_eq!(available(&session), vec!["x", "y", "z"]);
        session.remove_tag(&RecordId::Int(2), "z").unwrap();
        assert_eq!(available(&session), vec!["x", "y"]);
    }

    fn available(session: &Session) -> Vec<String> {
        session.available_tags().into_iter().collect()
    }

    #[test]
    fn mutations_persist_through_the_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("feedvault.db");

        let mut session = Session::open(&path).unwrap();
        session.import_bytes(ARCHIVE.as_bytes()).unwrap();
        session.add_tag(&RecordId::Int(1), " keeper ").unwrap();
        assert_eq!(session.durability(), Durability::Committed);

        // In-memory and persisted views agree
        let reopened = Session::open(&path).unwrap();
        assert_eq!(reopened.collection(), session.collection());
        assert_eq!(reopened.collection()[0].tags, vec!["x", "keeper"]);
    }

    #[test]
    fn noop_mutations_do_not_touch_the_store() {
        let mut session = loaded_session();
        assert!(!session.add_tag(&RecordId::Int(1), "   ").unwrap());
        assert!(!session.add_tag(&RecordId::Int(99), "tag").unwrap());
        assert!(!session.remove_tag(&RecordId::Int(1), "absent").unwrap());
        assert!(!session.remove_tag(&RecordId::Int(99), "x").unwrap());
        assert_eq!(session.durability(), Durability::Committed);
    }

    #[test]
    fn reimport_preserves_user_tags() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("feedvault.db");

        let mut session = Session::open(&path).unwrap();
        session.import_bytes(ARCHIVE.as_bytes()).unwrap();
        session.add_tag(&RecordId::Int(2), "mine").unwrap();
        drop(session);

        let mut session = Session::open(&path).unwrap();
        session.import_bytes(ARCHIVE.as_bytes()).unwrap();
        // Prior tags first, then the import's own tags (duplicates and all)
        assert_eq!(session.collection()[1].tags, vec!["y", "mine", "y"]);
    }

    #[test]
    fn store_failure_keeps_in_memory_collection() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("feedvault.db");

        let mut session = Session::open(&path).unwrap();
        session.import_bytes(ARCHIVE.as_bytes()).unwrap();

        // A second connection holding an exclusive lock makes the next
        // write fail with SQLITE_BUSY.
        let blocker = rusqlite::Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let result = session.add_tag(&RecordId::Int(1), "survivor");
        assert!(matches!(result, Err(SessionError::Store(_))));
        // The optimistic update is retained and marked pending
        assert_eq!(session.collection()[0].tags, vec!["x", "survivor"]);
        assert_eq!(session.durability(), Durability::Pending);
        // Reload is refused while pending
        assert!(!session.reload().unwrap());

        // Once the lock clears, a retry commits the same collection
        blocker.execute_batch("COMMIT").unwrap();
        drop(blocker);
        session.persist().unwrap();
        assert_eq!(session.durability(), Durability::Committed);

        let reopened = Session::open(&path).unwrap();
        assert_eq!(reopened.collection()[0].tags, vec!["x", "survivor"]);
    }

    #[test]
    fn export_is_two_space_indented_json() {
        let session = loaded_session();
        let bytes = session.export_json().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n  {"));

        // Exports re-import losslessly
        let mut fresh = Session::open_in_memory().unwrap();
        let outcome = fresh.import_bytes(text.as_bytes()).unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Imported {
                count: 3,
                skipped: 0
            }
        );
        assert_eq!(fresh.collection(), session.collection());
    }
}
