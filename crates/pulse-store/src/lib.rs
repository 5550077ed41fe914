//! # pulse-store
//!
//! Local cache for the Pulse application, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every cache
//! record.  Writes bump a per-table generation counter ([`TableEvents`]) so
//! that higher layers can expose live queries over the cache contents.

pub mod alerts;
pub mod classifieds;
pub mod database;
pub mod drafts;
pub mod events;
pub mod migrations;
pub mod models;
pub mod news;
pub mod outbox;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use events::{Table, TableEvents};
pub use models::*;

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
