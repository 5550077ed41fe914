//! CRUD operations for [`UserRecord`] rows and the current-user marker.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::events::Table;
use crate::models::UserRecord;

const COLUMNS: &str = "id, username, display_name, email, avatar_url, wallet_address, \
     token_balance, reputation_score, is_verified, created_at, is_current, fetched_at";

impl Database {
    /// Insert or replace a user row.  If `record.is_current` is set, every
    /// other row's marker is cleared first so at most one row carries it.
    pub fn upsert_user(&self, record: &UserRecord) -> Result<()> {
        if record.is_current {
            self.conn().execute("UPDATE users SET is_current = 0", [])?;
        }
        self.conn().execute(
            "INSERT OR REPLACE INTO users (id, username, display_name, email, avatar_url, \
             wallet_address, token_balance, reputation_score, is_verified, created_at, \
             is_current, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.id,
                record.username,
                record.display_name,
                record.email,
                record.avatar_url,
                record.wallet_address,
                record.token_balance,
                record.reputation_score,
                record.is_verified,
                record.created_at,
                record.is_current,
                record.fetched_at,
            ],
        )?;
        self.events().bump(Table::Users);
        Ok(())
    }

    /// Fetch a user row by id.
    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(record)
    }

    /// Fetch the row flagged as the current user, if any.
    pub fn get_current_user(&self) -> Result<Option<UserRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE is_current = 1 LIMIT 1"),
                [],
                row_to_user,
            )
            .optional()?;
        Ok(record)
    }

    /// Clear the current-user marker without touching the rows.
    pub fn clear_current_user(&self) -> Result<()> {
        self.conn().execute("UPDATE users SET is_current = 0", [])?;
        self.events().bump(Table::Users);
        Ok(())
    }

    /// Delete every user row (logout).
    pub fn clear_all_users(&self) -> Result<()> {
        self.conn().execute("DELETE FROM users", [])?;
        self.events().bump(Table::Users);
        Ok(())
    }

    /// Update the token balance on the current-user row.
    pub fn update_token_balance(&self, balance: i64) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE users SET token_balance = ?1 WHERE is_current = 1",
            params![balance],
        )?;
        if affected > 0 {
            self.events().bump(Table::Users);
        }
        Ok(())
    }
}

/// Map a `rusqlite::Row` to a [`UserRecord`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        email: row.get(3)?,
        avatar_url: row.get(4)?,
        wallet_address: row.get(5)?,
        token_balance: row.get(6)?,
        reputation_score: row.get(7)?,
        is_verified: row.get(8)?,
        created_at: row.get(9)?,
        is_current: row.get(10)?,
        fetched_at: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, is_current: bool) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            username: format!("user_{id}"),
            display_name: "Asha".to_string(),
            email: Some("asha@example.com".to_string()),
            avatar_url: None,
            wallet_address: None,
            token_balance: 120,
            reputation_score: 7,
            is_verified: false,
            created_at: 1_700_000_000_000,
            is_current,
            fetched_at: 1_700_000_100_000,
        }
    }

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn at_most_one_current_user() {
        let (_dir, db) = open_db();
        db.upsert_user(&sample("u1", true)).unwrap();
        db.upsert_user(&sample("u2", true)).unwrap();

        let current = db.get_current_user().unwrap().unwrap();
        assert_eq!(current.id, "u2");
        assert!(!db.get_user_by_id("u1").unwrap().unwrap().is_current);
    }

    #[test]
    fn balance_update_targets_current_user() {
        let (_dir, db) = open_db();
        db.upsert_user(&sample("u1", false)).unwrap();
        db.upsert_user(&sample("u2", true)).unwrap();

        db.update_token_balance(999).unwrap();

        assert_eq!(db.get_user_by_id("u1").unwrap().unwrap().token_balance, 120);
        assert_eq!(db.get_user_by_id("u2").unwrap().unwrap().token_balance, 999);
    }

    #[test]
    fn logout_clears_everything() {
        let (_dir, db) = open_db();
        db.upsert_user(&sample("u1", true)).unwrap();

        db.clear_current_user().unwrap();
        assert!(db.get_current_user().unwrap().is_none());

        db.clear_all_users().unwrap();
        assert!(db.get_user_by_id("u1").unwrap().is_none());
    }
}
