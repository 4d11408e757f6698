//! SQLite-backed snapshot store, one namespace per session name.
//!
//! # Invariants
//! - Rows are keyed by `(session_id, key)`; `set` is an upsert.
//! - Sessions never read each other's snapshots.

use super::{SnapshotResult, SnapshotStore};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Snapshot store persisting to the `session_snapshots` table.
pub struct SqliteSnapshotStore<'conn> {
    conn: &'conn Connection,
    session_id: String,
}

impl<'conn> SqliteSnapshotStore<'conn> {
    pub fn new(conn: &'conn Connection, session_id: impl Into<String>) -> Self {
        Self {
            conn,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Drops every snapshot of this session.
    pub fn clear(&mut self) -> SnapshotResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM session_snapshots WHERE session_id = ?1;",
            [self.session_id.as_str()],
        )?;
        Ok(removed)
    }
}

impl SnapshotStore for SqliteSnapshotStore<'_> {
    fn get(&self, key: &str) -> SnapshotResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session_snapshots WHERE session_id = ?1 AND key = ?2;",
                params![self.session_id.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: String) -> SnapshotResult<()> {
        self.conn.execute(
            "INSERT INTO session_snapshots (session_id, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (session_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.session_id.as_str(), key, value.as_str()],
        )?;
        debug!(
            "event=snapshot_write module=session status=ok key={} bytes={}",
            key,
            value.len()
        );
        Ok(())
    }
}
