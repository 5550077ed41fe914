//! CRUD operations for [`AlertRecord`] rows, including the lazy expiry pass.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::events::Table;
use crate::models::AlertRecord;

const COLUMNS: &str = "id, title, description, kind, severity, latitude, longitude, address, \
     radius_meters, author_id, is_active, expires_at, created_at, is_synced, fetched_at";

impl Database {
    /// Insert or replace a single alert row, keyed by id.
    pub fn upsert_alert(&self, record: &AlertRecord) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO alerts (id, title, description, kind, severity, \
             latitude, longitude, address, radius_meters, author_id, is_active, expires_at, \
             created_at, is_synced, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                record.id,
                record.title,
                record.description,
                record.kind,
                record.severity,
                record.latitude,
                record.longitude,
                record.address,
                record.radius_meters,
                record.author_id,
                record.is_active,
                record.expires_at,
                record.created_at,
                record.is_synced,
                record.fetched_at,
            ],
        )?;
        self.events().bump(Table::Alerts);
        Ok(())
    }

    /// Insert or replace a batch of alert rows.
    pub fn upsert_alerts_batch(&self, records: &[AlertRecord]) -> Result<()> {
        for record in records {
            self.upsert_alert(record)?;
        }
        Ok(())
    }

    /// Fetch a single alert row by id.
    pub fn get_alert_by_id(&self, id: &str) -> Result<Option<AlertRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM alerts WHERE id = ?1"),
                params![id],
                row_to_alert,
            )
            .optional()?;
        Ok(record)
    }

    /// List alerts, newest first.  `active_only` restricts to `is_active` rows.
    pub fn list_alerts(&self, active_only: bool) -> Result<Vec<AlertRecord>> {
        let sql = if active_only {
            format!("SELECT {COLUMNS} FROM alerts WHERE is_active = 1 ORDER BY created_at DESC")
        } else {
            format!("SELECT {COLUMNS} FROM alerts ORDER BY created_at DESC")
        };
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], row_to_alert)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Delete an alert row by id.  Returns `true` if a row was deleted.
    pub fn delete_alert(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM alerts WHERE id = ?1", params![id])?;
        if affected > 0 {
            self.events().bump(Table::Alerts);
        }
        Ok(affected > 0)
    }

    /// Flip `is_active` off for every alert whose expiry lies before `now_ms`.
    /// Returns the number of rows deactivated.  This is the only place expiry
    /// is enforced; it runs when a refresh is triggered, not on a timer.
    pub fn deactivate_expired_alerts(&self, now_ms: i64) -> Result<usize> {
        let affected = self.conn().execute(
            "UPDATE alerts SET is_active = 0 \
             WHERE expires_at IS NOT NULL AND expires_at < ?1 AND is_active = 1",
            params![now_ms],
        )?;
        if affected > 0 {
            tracing::debug!(deactivated = affected, "expired alerts deactivated");
            self.events().bump(Table::Alerts);
        }
        Ok(affected)
    }

    /// Tombstoning pass after a refresh: delete synced rows absent from the
    /// authoritative id set.  Returns the number of rows removed.
    pub fn retain_alerts(&self, keep_ids: &[String]) -> Result<usize> {
        let cached: Vec<String> = {
            let mut stmt = self
                .conn()
                .prepare("SELECT id FROM alerts WHERE is_synced = 1")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        let mut removed = 0;
        for id in cached {
            if !keep_ids.contains(&id) {
                removed += self
                    .conn()
                    .execute("DELETE FROM alerts WHERE id = ?1", params![&id])?;
            }
        }
        if removed > 0 {
            self.events().bump(Table::Alerts);
        }
        Ok(removed)
    }
}

/// Map a `rusqlite::Row` to an [`AlertRecord`].
fn row_to_alert(row: &rusqlite::Row<'_>) -> rusqlite::Result<AlertRecord> {
    Ok(AlertRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        severity: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        address: row.get(7)?,
        radius_meters: row.get(8)?,
        author_id: row.get(9)?,
        is_active: row.get(10)?,
        expires_at: row.get(11)?,
        created_at: row.get(12)?,
        is_synced: row.get(13)?,
        fetched_at: row.get(14)?,
    })
}
