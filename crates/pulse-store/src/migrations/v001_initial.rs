//! v001 -- Initial schema creation.
//!
//! Creates the five entity tables (`news`, `alerts`, `users`, `classifieds`,
//! `drafts`) plus the `outbox` queue for pending offline writes.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- News
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS news (
    id             TEXT PRIMARY KEY NOT NULL,  -- server-assigned, immutable
    title          TEXT NOT NULL,
    content        TEXT NOT NULL,
    author_id      TEXT NOT NULL,
    author_name    TEXT NOT NULL,
    image_url      TEXT,
    category       TEXT NOT NULL,              -- wire value, decoded lazily
    is_verified    INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    content_hash   TEXT,
    likes_count    INTEGER NOT NULL DEFAULT 0,
    comments_count INTEGER NOT NULL DEFAULT 0,
    created_at     INTEGER NOT NULL,           -- epoch millis
    updated_at     INTEGER NOT NULL,
    is_synced      INTEGER NOT NULL DEFAULT 1, -- 0 only for outbox-provisional rows
    fetched_at     INTEGER NOT NULL            -- epoch millis of last remote write
);

CREATE INDEX IF NOT EXISTS idx_news_category_created
    ON news(category, created_at DESC);

-- ----------------------------------------------------------------
-- Alerts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS alerts (
    id            TEXT PRIMARY KEY NOT NULL,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    kind          TEXT NOT NULL,               -- emergency / warning / info
    severity      INTEGER NOT NULL,            -- ordinal 1-5
    latitude      REAL,
    longitude     REAL,
    address       TEXT,
    radius_meters INTEGER,
    author_id     TEXT NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,
    expires_at    INTEGER,                     -- epoch millis, nullable
    created_at    INTEGER NOT NULL,
    is_synced     INTEGER NOT NULL DEFAULT 1,
    fetched_at    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_alerts_active_created
    ON alerts(is_active, created_at DESC);

-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id               TEXT PRIMARY KEY NOT NULL,
    username         TEXT NOT NULL,
    display_name     TEXT NOT NULL,
    email            TEXT,
    avatar_url       TEXT,
    wallet_address   TEXT,
    token_balance    INTEGER NOT NULL DEFAULT 0,
    reputation_score INTEGER NOT NULL DEFAULT 0,
    is_verified      INTEGER NOT NULL DEFAULT 0,
    created_at       INTEGER NOT NULL,
    is_current       INTEGER NOT NULL DEFAULT 0, -- at most one row set
    fetched_at       INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_current ON users(is_current);

-- ----------------------------------------------------------------
-- Classifieds
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS classifieds (
    id          TEXT PRIMARY KEY NOT NULL,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    price       REAL,
    currency    TEXT NOT NULL,
    category    TEXT NOT NULL,
    images      TEXT NOT NULL,                 -- comma-joined references
    seller_id   TEXT NOT NULL,
    seller_name TEXT NOT NULL,
    latitude    REAL,
    longitude   REAL,
    address     TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  INTEGER NOT NULL,
    is_synced   INTEGER NOT NULL DEFAULT 1,
    fetched_at  INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_classifieds_category
    ON classifieds(category, created_at DESC);

-- ----------------------------------------------------------------
-- Drafts (local-only, never synced)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS drafts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    kind       TEXT NOT NULL,                  -- news / alert / classified
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    category   TEXT,
    image_url  TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- ----------------------------------------------------------------
-- Outbox (pending offline writes)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS outbox (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    idempotency_key TEXT NOT NULL UNIQUE,
    operation       TEXT NOT NULL,             -- tag matching the payload shape
    payload         TEXT NOT NULL,             -- JSON
    provisional_id  TEXT,                      -- cache row created optimistically
    attempts        INTEGER NOT NULL DEFAULT 0,
    last_error      TEXT,
    created_at      INTEGER NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
