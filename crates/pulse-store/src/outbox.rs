//! The durable queue of pending offline writes.
//!
//! Entries are appended when a create fails with a retryable (transport)
//! error and replayed in insertion order by the data layer's drainer.  The
//! payload is opaque JSON here; the data layer owns the operation shapes.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::events::Table;
use crate::models::OutboxEntry;
use crate::now_millis;

const COLUMNS: &str =
    "id, idempotency_key, operation, payload, provisional_id, attempts, last_error, created_at";

impl Database {
    /// Append a pending write.  Returns the entry id.
    pub fn enqueue_outbox(
        &self,
        idempotency_key: &str,
        operation: &str,
        payload: &str,
        provisional_id: Option<&str>,
    ) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO outbox (idempotency_key, operation, payload, provisional_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![idempotency_key, operation, payload, provisional_id, now_millis()],
        )?;
        let id = self.conn().last_insert_rowid();
        tracing::info!(entry = id, operation, "queued offline write");
        self.events().bump(Table::Outbox);
        Ok(id)
    }

    /// All pending entries, oldest first.
    pub fn list_outbox(&self) -> Result<Vec<OutboxEntry>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {COLUMNS} FROM outbox ORDER BY id ASC"))?;
        let rows = stmt.query_map([], row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Fetch one entry by id.
    pub fn get_outbox_entry(&self, id: i64) -> Result<Option<OutboxEntry>> {
        let entry = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM outbox WHERE id = ?1"),
                params![id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Remove an entry after it was drained (or permanently rejected).
    pub fn delete_outbox_entry(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM outbox WHERE id = ?1", params![id])?;
        if affected > 0 {
            self.events().bump(Table::Outbox);
        }
        Ok(affected > 0)
    }

    /// Record a failed replay attempt, keeping the entry queued.
    pub fn record_outbox_attempt(&self, id: i64, error: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE outbox SET attempts = attempts + 1, last_error = ?2 WHERE id = ?1",
            params![id, error],
        )?;
        self.events().bump(Table::Outbox);
        Ok(())
    }
}

/// Map a `rusqlite::Row` to an [`OutboxEntry`].
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<OutboxEntry> {
    Ok(OutboxEntry {
        id: row.get(0)?,
        idempotency_key: row.get(1)?,
        operation: row.get(2)?,
        payload: row.get(3)?,
        provisional_id: row.get(4)?,
        attempts: row.get(5)?,
        last_error: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn enqueue_preserves_order() {
        let (_dir, db) = open_db();
        db.enqueue_outbox("k1", "create_news", "{}", Some("local-1"))
            .unwrap();
        db.enqueue_outbox("k2", "like_news", "{}", None).unwrap();

        let entries = db.list_outbox().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].idempotency_key, "k1");
        assert_eq!(entries[0].provisional_id.as_deref(), Some("local-1"));
        assert_eq!(entries[1].operation, "like_news");
    }

    #[test]
    fn duplicate_idempotency_key_rejected() {
        let (_dir, db) = open_db();
        db.enqueue_outbox("k1", "create_news", "{}", None).unwrap();
        assert!(db.enqueue_outbox("k1", "create_news", "{}", None).is_err());
    }

    #[test]
    fn attempt_bookkeeping_and_delete() {
        let (_dir, db) = open_db();
        let id = db.enqueue_outbox("k1", "create_news", "{}", None).unwrap();

        db.record_outbox_attempt(id, "connection refused").unwrap();
        let entry = db.get_outbox_entry(id).unwrap().unwrap();
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.last_error.as_deref(), Some("connection refused"));

        assert!(db.delete_outbox_entry(id).unwrap());
        assert!(db.get_outbox_entry(id).unwrap().is_none());
    }
}
