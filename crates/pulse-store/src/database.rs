//! The cache connection handle.
//!
//! [`Database`] owns the single `rusqlite::Connection` and the per-table
//! change counters; a handle that exists has already passed migrations, so
//! every CRUD helper can assume the current schema.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::events::TableEvents;
use crate::migrations;

/// Open cache database plus its change-notification counters.
pub struct Database {
    conn: Connection,
    events: TableEvents,
}

impl Database {
    /// Open (or create) the cache at its default location, the platform data
    /// directory (`~/.local/share/pulse/pulse.db` on Linux).
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "pulse", "pulse").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("pulse.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) the cache at an explicit path.  Tests point this at a
    /// temp directory; embedders at their own layout.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn,
            events: TableEvents::new(),
        })
    }

    /// The raw connection, for ad-hoc queries the typed helpers do not cover.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Per-table change notification handle.  Cloneable and cheap; subscribers
    /// outlive any lock taken around the [`Database`] itself.
    pub fn events(&self) -> TableEvents {
        self.events.clone()
    }

    /// Filesystem path of the open database, absent for in-memory ones.
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
