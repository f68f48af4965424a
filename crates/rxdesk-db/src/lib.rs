//! Database layer for rxdesk.
//!
//! Provides a `Database` struct that owns the SQLite connection and exposes
//! the named slots the record stores persist into.

mod slots;

pub use slots::Slots;

use rusqlite::Connection;
use rxdesk_records::{SlotError, SlotStorage};
use std::path::PathBuf;
use std::sync::Mutex;

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/rxdesk/rxdesk.db`.
    pub fn open() -> Result<Self, rusqlite::Error> {
        let db_path = Self::default_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "Opened slot database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the default database path.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rxdesk")
            .join("rxdesk.db")
    }

    /// Access the slots table.
    pub fn slots(&self) -> Slots<'_> {
        let conn = self.conn.lock().expect("Database lock poisoned");
        Slots::new(conn)
    }

    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
    }
}

impl SlotStorage for Database {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        self.slots()
            .get(key)
            .map_err(|e| SlotError::Backend(Box::new(e)))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SlotError> {
        self.slots()
            .put(key, value)
            .map_err(|e| SlotError::Backend(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxdesk_records::{
        JsonSlot, Prescription, PrescriptionDraft, PrescriptionStore, Status, StatusFilter,
        PRESCRIPTIONS_SLOT,
    };

    #[test]
    fn test_put_and_get() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.slots().get("prescriptions").unwrap().is_none());

        db.slots().put("prescriptions", "[]").unwrap();
        assert_eq!(
            db.slots().get("prescriptions").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_put_replaces_value() {
        let db = Database::open_in_memory().unwrap();

        db.slots().put("medicines", "[1]").unwrap();
        let first = db.slots().updated_at("medicines").unwrap().unwrap();
        db.slots().put("medicines", "[1,2]").unwrap();

        assert_eq!(db.slots().get("medicines").unwrap().as_deref(), Some("[1,2]"));
        assert!(db.slots().updated_at("medicines").unwrap().unwrap() >= first);
        assert_eq!(db.slots().names().unwrap(), vec!["medicines".to_string()]);
    }

    #[test]
    fn test_store_round_trip_through_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rxdesk.db");

        {
            let db = Database::open_at(&path).unwrap();
            let mut store = PrescriptionStore::open(JsonSlot::new(&db, PRESCRIPTIONS_SLOT));
            let draft = PrescriptionDraft::new(
                "Amy",
                "Dr. X",
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )
            .with_medication("Aspirin 100mg");
            store.create(draft).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let store: PrescriptionStore<JsonSlot<&Database, Prescription>> =
            PrescriptionStore::open(JsonSlot::new(&db, PRESCRIPTIONS_SLOT));
        assert!(!store.was_seeded());
        assert_eq!(store.records().len(), 3);

        let amy = store.list("amy", StatusFilter::Only(Status::Pending));
        assert_eq!(amy.len(), 1);
        assert_eq!(amy[0].id, 3);
    }

    #[test]
    fn test_malformed_row_falls_back_to_seed() {
        let db = Database::open_in_memory().unwrap();
        db.slots().put(PRESCRIPTIONS_SLOT, "not json").unwrap();

        let store = PrescriptionStore::open(JsonSlot::new(&db, PRESCRIPTIONS_SLOT));
        assert!(store.was_seeded());
        assert_eq!(store.records().len(), 2);
    }
}
