//! Slots table: one row per named slot, holding the slot's JSON text.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::MutexGuard;

/// Slots store with a borrowed connection.
pub struct Slots<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Slots<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Read a slot's value.
    pub fn get(&self, name: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT value FROM slots WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
    }

    /// Write a slot (insert or replace the whole value).
    pub fn put(&self, name: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            r#"
            INSERT INTO slots (name, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![name, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    /// When a slot was last written.
    pub fn updated_at(&self, name: &str) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM slots WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }))
    }

    /// Names of every slot that has been written.
    pub fn names(&self) -> Result<Vec<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT name FROM slots ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }

        Ok(names)
    }
}
