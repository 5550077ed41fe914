//! CRUD operations for [`DraftRecord`] rows.
//!
//! Drafts are local-only: they never touch the remote API and carry no sync
//! metadata.  Ids are SQLite rowids, assigned on first insert.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::events::Table;
use crate::models::DraftRecord;

const COLUMNS: &str = "id, kind, title, content, category, image_url, created_at, updated_at";

impl Database {
    /// Insert a draft (id == 0) or replace an existing one.  Returns the
    /// draft's id.
    pub fn upsert_draft(&self, record: &DraftRecord) -> Result<i64> {
        let id = if record.id == 0 {
            self.conn().execute(
                "INSERT INTO drafts (kind, title, content, category, image_url, \
                 created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.kind,
                    record.title,
                    record.content,
                    record.category,
                    record.image_url,
                    record.created_at,
                    record.updated_at,
                ],
            )?;
            self.conn().last_insert_rowid()
        } else {
            self.conn().execute(
                "INSERT OR REPLACE INTO drafts (id, kind, title, content, category, \
                 image_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.kind,
                    record.title,
                    record.content,
                    record.category,
                    record.image_url,
                    record.created_at,
                    record.updated_at,
                ],
            )?;
            record.id
        };
        self.events().bump(Table::Drafts);
        Ok(id)
    }

    /// Fetch a draft by id.
    pub fn get_draft_by_id(&self, id: i64) -> Result<Option<DraftRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM drafts WHERE id = ?1"),
                params![id],
                row_to_draft,
            )
            .optional()?;
        Ok(record)
    }

    /// List drafts, most recently updated first, optionally filtered by kind.
    pub fn list_drafts(&self, kind: Option<&str>) -> Result<Vec<DraftRecord>> {
        let mut records = Vec::new();
        match kind {
            Some(kind) => {
                let mut stmt = self.conn().prepare(&format!(
                    "SELECT {COLUMNS} FROM drafts WHERE kind = ?1 ORDER BY updated_at DESC"
                ))?;
                let rows = stmt.query_map(params![kind], row_to_draft)?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn().prepare(&format!(
                    "SELECT {COLUMNS} FROM drafts ORDER BY updated_at DESC"
                ))?;
                let rows = stmt.query_map([], row_to_draft)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }
        Ok(records)
    }

    /// Delete a draft by id.  Returns `true` if a row was deleted.
    pub fn delete_draft(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM drafts WHERE id = ?1", params![id])?;
        if affected > 0 {
            self.events().bump(Table::Drafts);
        }
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to a [`DraftRecord`].
fn row_to_draft(row: &rusqlite::Row<'_>) -> rusqlite::Result<DraftRecord> {
    Ok(DraftRecord {
        id: row.get(0)?,
        kind: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        category: row.get(4)?,
        image_url: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: &str) -> DraftRecord {
        DraftRecord {
            id: 0,
            kind: kind.to_string(),
            title: "Unfinished post".to_string(),
            content: "...".to_string(),
            category: None,
            image_url: None,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn insert_assigns_monotonic_ids() {
        let (_dir, db) = open_db();
        let first = db.upsert_draft(&sample("news")).unwrap();
        let second = db.upsert_draft(&sample("alert")).unwrap();

        assert!(second > first);
        assert!(db.get_draft_by_id(first).unwrap().is_some());
    }

    #[test]
    fn update_keeps_id() {
        let (_dir, db) = open_db();
        let id = db.upsert_draft(&sample("news")).unwrap();

        let mut updated = db.get_draft_by_id(id).unwrap().unwrap();
        updated.title = "Finished post".to_string();
        let same_id = db.upsert_draft(&updated).unwrap();

        assert_eq!(same_id, id);
        assert_eq!(
            db.get_draft_by_id(id).unwrap().unwrap().title,
            "Finished post"
        );
    }

    #[test]
    fn list_filters_by_kind_and_delete_removes() {
        let (_dir, db) = open_db();
        db.upsert_draft(&sample("news")).unwrap();
        let alert_id = db.upsert_draft(&sample("alert")).unwrap();

        assert_eq!(db.list_drafts(Some("alert")).unwrap().len(), 1);
        assert!(db.delete_draft(alert_id).unwrap());
        assert!(db.list_drafts(Some("alert")).unwrap().is_empty());
        assert!(!db.delete_draft(alert_id).unwrap());
    }
}
