//! CRUD operations for [`ClassifiedRecord`] rows.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::events::Table;
use crate::models::ClassifiedRecord;

const COLUMNS: &str = "id, title, description, price, currency, category, images, seller_id, \
     seller_name, latitude, longitude, address, is_active, created_at, is_synced, fetched_at";

impl Database {
    /// Insert or replace a single classified row, keyed by id.
    pub fn upsert_classified(&self, record: &ClassifiedRecord) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO classifieds (id, title, description, price, currency, \
             category, images, seller_id, seller_name, latitude, longitude, address, \
             is_active, created_at, is_synced, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                record.id,
                record.title,
                record.description,
                record.price,
                record.currency,
                record.category,
                record.images,
                record.seller_id,
                record.seller_name,
                record.latitude,
                record.longitude,
                record.address,
                record.is_active,
                record.created_at,
                record.is_synced,
                record.fetched_at,
            ],
        )?;
        self.events().bump(Table::Classifieds);
        Ok(())
    }

    /// Insert or replace a batch of classified rows.
    pub fn upsert_classifieds_batch(&self, records: &[ClassifiedRecord]) -> Result<()> {
        for record in records {
            self.upsert_classified(record)?;
        }
        Ok(())
    }

    /// Fetch a single classified row by id.
    pub fn get_classified_by_id(&self, id: &str) -> Result<Option<ClassifiedRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM classifieds WHERE id = ?1"),
                params![id],
                row_to_classified,
            )
            .optional()?;
        Ok(record)
    }

    /// List active classifieds, newest first, optionally filtered by category.
    pub fn list_active_classifieds(&self, category: Option<&str>) -> Result<Vec<ClassifiedRecord>> {
        let mut records = Vec::new();
        match category {
            Some(category) => {
                let mut stmt = self.conn().prepare(&format!(
                    "SELECT {COLUMNS} FROM classifieds \
                     WHERE is_active = 1 AND category = ?1 ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map(params![category], row_to_classified)?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn().prepare(&format!(
                    "SELECT {COLUMNS} FROM classifieds WHERE is_active = 1 ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map([], row_to_classified)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }
        Ok(records)
    }

    /// Tombstoning pass after a refresh: delete synced rows in the scope absent
    /// from the authoritative id set.  Returns the number of rows removed.
    pub fn retain_classifieds(&self, category: Option<&str>, keep_ids: &[String]) -> Result<usize> {
        let cached: Vec<String> = {
            let mut stmt = match category {
                Some(_) => self.conn().prepare(
                    "SELECT id FROM classifieds WHERE category = ?1 AND is_synced = 1",
                )?,
                None => self
                    .conn()
                    .prepare("SELECT id FROM classifieds WHERE is_synced = 1")?,
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
                    .execute("DELETE FROM classifieds WHERE id = ?1", params![&id])?;
            }
        }
        if removed > 0 {
            self.events().bump(Table::Classifieds);
        }
        Ok(removed)
    }
}

/// Map a `rusqlite::Row` to a [`ClassifiedRecord`].
fn row_to_classified(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClassifiedRecord> {
    Ok(ClassifiedRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        currency: row.get(4)?,
        category: row.get(5)?,
        images: row.get(6)?,
        seller_id: row.get(7)?,
        seller_name: row.get(8)?,
        latitude: row.get(9)?,
        longitude: row.get(10)?,
        address: row.get(11)?,
        is_active: row.get(12)?,
        created_at: row.get(13)?,
        is_synced: row.get(14)?,
        fetched_at: row.get(15)?,
    })
}
