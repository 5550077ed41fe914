//! CRUD operations for [`NewsRecord`] rows.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::events::Table;
use crate::models::NewsRecord;

const COLUMNS: &str = "id, title, content, author_id, author_name, image_url, category, \
     is_verified, content_hash, likes_count, comments_count, created_at, updated_at, \
     is_synced, fetched_at";

impl Database {
    /// Insert or replace a single news row, keyed by id.
    pub fn upsert_news(&self, record: &NewsRecord) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO news (id, title, content, author_id, author_name, \
             image_url, category, is_verified, content_hash, likes_count, comments_count, \
             created_at, updated_at, is_synced, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                record.id,
                record.title,
                record.content,
                record.author_id,
                record.author_name,
                record.image_url,
                record.category,
                record.is_verified,
                record.content_hash,
                record.likes_count,
                record.comments_count,
                record.created_at,
                record.updated_at,
                record.is_synced,
                record.fetched_at,
            ],
        )?;
        self.events().bump(Table::News);
        Ok(())
    }

    /// Insert or replace a batch of news rows.
    pub fn upsert_news_batch(&self, records: &[NewsRecord]) -> Result<()> {
        for record in records {
            self.upsert_news(record)?;
        }
        Ok(())
    }

    /// Fetch a single news row by id.  `None` means the cache has no row.
    pub fn get_news_by_id(&self, id: &str) -> Result<Option<NewsRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM news WHERE id = ?1"),
                params![id],
                row_to_news,
            )
            .optional()?;
        Ok(record)
    }

    /// List news, newest first, optionally filtered by wire category.
    pub fn list_news(&self, category: Option<&str>) -> Result<Vec<NewsRecord>> {
        let mut records = Vec::new();
        match category {
            Some(category) => {
                let mut stmt = self.conn().prepare(&format!(
                    "SELECT {COLUMNS} FROM news WHERE category = ?1 ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map(params![category], row_to_news)?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = self
                    .conn()
                    .prepare(&format!("SELECT {COLUMNS} FROM news ORDER BY created_at DESC"))?;
                let rows = stmt.query_map([], row_to_news)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }
        Ok(records)
    }

    /// Delete a news row by id.  Returns `true` if a row was deleted.
    pub fn delete_news(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM news WHERE id = ?1", params![id])?;
        if affected > 0 {
            self.events().bump(Table::News);
        }
        Ok(affected > 0)
    }

    /// Tombstoning pass after a refresh: delete every *synced* row in the query
    /// scope whose id is absent from the authoritative set.  Provisional
    /// (outbox) rows are left alone.  Returns the number of rows removed.
    pub fn retain_news(&self, category: Option<&str>, keep_ids: &[String]) -> Result<usize> {
        let cached: Vec<String> = {
            let mut stmt = match category {
                Some(_) => self.conn().prepare(
                    "SELECT id FROM news WHERE category = ?1 AND is_synced = 1",
                )?,
                None => self.conn().prepare("SELECT id FROM news WHERE is_synced = 1")?,
            };
            match category {
                Some(category) => stmt
                    .query_map(params![category], |row| row.get(0))?
                    .collect::<rusqlite::Result<_>>()?,
                None => stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<_>>()?,
            }
        };

        let mut removed = 0;
        for id in cached {
            if !keep_ids.contains(&id) {
                removed += self
                    .conn()
                    .execute("DELETE FROM news WHERE id = ?1", params![&id])?;
            }
        }
        if removed > 0 {
            self.events().bump(Table::News);
        }
        Ok(removed)
    }
}

/// Map a `rusqlite::Row` to a [`NewsRecord`].
fn row_to_news(row: &rusqlite::Row<'_>) -> rusqlite::Result<NewsRecord> {
    Ok(NewsRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author_id: row.get(3)?,
        author_name: row.get(4)?,
        image_url: row.get(5)?,
        category: row.get(6)?,
        is_verified: row.get(7)?,
        content_hash: row.get(8)?,
        likes_count: row.get(9)?,
        comments_count: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
        is_synced: row.get(13)?,
        fetched_at: row.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, category: &str) -> NewsRecord {
        NewsRecord {
            id: id.to_string(),
            title: "Road closure".to_string(),
            content: "Main street closed for repairs".to_string(),
            author_id: "u1".to_string(),
            author_name: "County Desk".to_string(),
            image_url: None,
            category: category.to_string(),
            is_verified: true,
            content_hash: None,
            likes_count: 3,
            comments_count: 1,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
            is_synced: true,
            fetched_at: 1_700_000_100_000,
        }
    }

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn upsert_and_get() {
        let (_dir, db) = open_db();
        let record = sample("n1", "local");

        db.upsert_news(&record).unwrap();

        let loaded = db.get_news_by_id("n1").unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(db.get_news_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn upsert_replaces_by_id() {
        let (_dir, db) = open_db();
        db.upsert_news(&sample("n1", "local")).unwrap();

        let mut updated = sample("n1", "local");
        updated.likes_count = 42;
        db.upsert_news(&updated).unwrap();

        let loaded = db.get_news_by_id("n1").unwrap().unwrap();
        assert_eq!(loaded.likes_count, 42);
        assert_eq!(db.list_news(None).unwrap().len(), 1);
    }

    #[test]
    fn list_filters_by_category() {
        let (_dir, db) = open_db();
        db.upsert_news(&sample("n1", "local")).unwrap();
        db.upsert_news(&sample("n2", "sports")).unwrap();

        assert_eq!(db.list_news(None).unwrap().len(), 2);
        let sports = db.list_news(Some("sports")).unwrap();
        assert_eq!(sports.len(), 1);
        assert_eq!(sports[0].id, "n2");
    }

    #[test]
    fn retain_deletes_complement_in_scope_only() {
        let (_dir, db) = open_db();
        db.upsert_news(&sample("n1", "local")).unwrap();
        db.upsert_news(&sample("n2", "local")).unwrap();
        db.upsert_news(&sample("n3", "sports")).unwrap();

        let removed = db
            .retain_news(Some("local"), &["n1".to_string()])
            .unwrap();

        assert_eq!(removed, 1);
        assert!(db.get_news_by_id("n1").unwrap().is_some());
        assert!(db.get_news_by_id("n2").unwrap().is_none());
        // Out of scope, untouched.
        assert!(db.get_news_by_id("n3").unwrap().is_some());
    }

    #[test]
    fn retain_spares_provisional_rows() {
        let (_dir, db) = open_db();
        let mut provisional = sample("local-1", "local");
        provisional.is_synced = false;
        db.upsert_news(&provisional).unwrap();

        let removed = db.retain_news(None, &[]).unwrap();

        assert_eq!(removed, 0);
        assert!(db.get_news_by_id("local-1").unwrap().is_some());
    }
}
