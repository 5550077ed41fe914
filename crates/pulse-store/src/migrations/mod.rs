//! Schema versioning for the cache database.
//!
//! The applied schema revision lives in SQLite's `user_version` pragma.
//! Opening a database replays every revision above the stored one, in order,
//! so a fresh file and an old file both end up at [`CURRENT_VERSION`].

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Revision the code expects.  A new `vNNN_*` module bumps this by one.
const CURRENT_VERSION: u32 = 1;

/// Bring the connection's schema up to [`CURRENT_VERSION`].
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let applied: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if applied >= CURRENT_VERSION {
        return Ok(());
    }
    tracing::info!(applied, target = CURRENT_VERSION, "upgrading cache schema");

    if applied < 1 {
        v001_initial::up(conn).map_err(|e| StoreError::Migration(e.to_string()))?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}
