//! Durable ordered store for the record collection.
//!
//! A single SQLite database holds one `records` table keyed by record id,
//! with a secondary index on `seq` for display order. The only write
//! primitive is a transactional bulk replace; per-record upserts do not
//! exist, so the table always mirrors one complete collection.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

use crate::model::{MediaItem, Record, RecordId};

/// Schema version written to SQLite's `user_version` pragma
const SCHEMA_VERSION: i64 = 1;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("could not encode column: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Handle on the vault database
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Open (or create) the database at the given path and initialize the
    /// schema. Initialization is idempotent: reopening an existing database
    /// is a no-op beyond the `IF NOT EXISTS` checks.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Store {
            conn,
            path: path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (tests)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Store {
            conn,
            path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id          TEXT PRIMARY KEY,
                seq         INTEGER NOT NULL,
                screen_name TEXT NOT NULL DEFAULT '',
                full_text   TEXT NOT NULL DEFAULT '',
                url         TEXT NOT NULL DEFAULT '',
                media       TEXT NOT NULL DEFAULT '[]',
                tags        TEXT NOT NULL DEFAULT '[]'
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_seq ON records(seq)",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        self.conn
            .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }

    /// Record the wall-clock time of the last successful import
    pub fn set_last_import(&self, at: chrono::DateTime<chrono::Utc>) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES ('last_import', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Time of the last successful import, if any
    pub fn last_import(&self) -> Result<Option<chrono::DateTime<chrono::Utc>>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM meta WHERE key = 'last_import'")?;
        let value: Option<String> = stmt
            .query_row([], |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(value
            .and_then(|v| chrono::DateTime::parse_from_rfc3339(&v).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc)))
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection in ascending `seq` order. Returns an empty
    /// vec for a freshly created database.
    pub fn read_all_ordered(&self) -> Result<Vec<Record>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, seq, screen_name, full_text, url, media, tags
             FROM records ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, seq, screen_name, full_text, url, media, tags) = row?;
            records.push(Record {
                id: decode_id(&id)?,
                seq: seq as usize,
                screen_name,
                full_text,
                url,
                media: serde_json::from_str::<Vec<MediaItem>>(&media)?,
                tags: serde_json::from_str::<Vec<String>>(&tags)?,
            });
        }
        Ok(records)
    }

    /// Atomically clear the table and write the given collection, assigning
    /// each record's `seq` to its position in the input. All-or-nothing: the
    /// delete and every insert commit as one transaction, so a failure rolls
    /// back to the previous contents.
    pub fn replace_all(&mut self, records: &[Record]) -> Result<(), StoreError> {
        // Encode outside the transaction so a codec failure leaves the
        // database untouched.
        let mut rows = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            rows.push((
                encode_id(&record.id)?,
                i as i64,
                serde_json::to_string(&record.media)?,
                serde_json::to_string(&record.tags)?,
            ));
        }

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM records", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (id, seq, screen_name, full_text, url, media, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for ((id, seq, media, tags), record) in rows.iter().zip(records) {
                stmt.execute(params![
                    id,
                    seq,
                    record.screen_name,
                    record.full_text,
                    record.url,
                    media,
                    tags,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

}

/// Ids are stored JSON-encoded so the integer/string distinction survives a
/// round trip (`42` vs `"42"` stay distinct keys).
fn encode_id(id: &RecordId) -> Result<String, serde_json::Error> {
    serde_json::to_string(id)
}

fn decode_id(text: &str) -> Result<RecordId, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;
    use pretty_assertions::assert_eq;

    fn record(id: u64, tags: &[&str]) -> Record {
        let mut r = Record::new(RecordId::Int(id));
        r.screen_name = format!("user{}", id);
        r.full_text = format!("post {}", id);
        r.tags = tags.iter().map(|t| t.to_string()).collect();
        r
    }

    #[test]
    fn fresh_store_reads_empty() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.read_all_ordered().unwrap().is_empty());
    }

    #[test]
    fn replace_all_assigns_dense_sequence() {
        let mut store = Store::open_in_memory().unwrap();
        // Stale seq values on the way in must be ignored
        let mut records = vec![record(10, &[]), record(11, &["a"]), record(12, &[])];
        records[0].seq = 99;
        records[2].seq = 99;
        store.replace_all(&records).unwrap();

        let read = store.read_all_ordered().unwrap();
        let seqs: Vec<usize> = read.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(read[1].tags, vec!["a"]);
    }

    #[test]
    fn replace_all_clears_previous_contents() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .replace_all(&[record(1, &[]), record(2, &[])])
            .unwrap();
        store.replace_all(&[record(3, &["x"])]).unwrap();

        let read = store.read_all_ordered().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, RecordId::Int(3));
        assert_eq!(read[0].seq, 0);
    }

    #[test]
    fn media_round_trips_through_columns() {
        let mut store = Store::open_in_memory().unwrap();
        let mut r = record(5, &["pics"]);
        r.media = vec![MediaItem {
            kind: MediaKind::AnimatedGif,
            original: "https://example.com/a.gif".into(),
        }];
        store.replace_all(std::slice::from_ref(&r)).unwrap();

        let read = store.read_all_ordered().unwrap();
        assert_eq!(read[0].media, r.media);
    }

    #[test]
    fn int_and_text_ids_stay_distinct() {
        let mut store = Store::open_in_memory().unwrap();
        let a = record(42, &[]);
        let mut b = Record::new(RecordId::Text("42".into()));
        b.full_text = "text id".into();
        store.replace_all(&[a, b]).unwrap();

        let read = store.read_all_ordered().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].id, RecordId::Int(42));
        assert_eq!(read[1].id, RecordId::Text("42".into()));
    }

    #[test]
    fn duplicate_ids_roll_back_whole_write() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_all(&[record(1, &["keep"])]).unwrap();

        // Second write violates the primary key halfway through; the first
        // collection must still be readable afterwards.
        let dup = vec![record(2, &[]), record(2, &[])];
        assert!(store.replace_all(&dup).is_err());

        let read = store.read_all_ordered().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].tags, vec!["keep"]);
    }

    #[test]
    fn last_import_round_trips() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.last_import().unwrap().is_none());

        let at = chrono::Utc::now();
        store.set_last_import(at).unwrap();
        let read = store.last_import().unwrap().unwrap();
        assert_eq!(read.timestamp(), at.timestamp());

        // Overwrites, not appends
        store.set_last_import(at).unwrap();
        assert!(store.last_import().unwrap().is_some());
    }

    #[test]
    fn reopen_preserves_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("feedvault.db");
        {
            let mut store = Store::open(&path).unwrap();
            store.replace_all(&[record(7, &["kept"])]).unwrap();
        }
        let store = Store::open(&path).unwrap();
        let read = store.read_all_ordered().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].tags, vec!["kept"]);
    }
}
