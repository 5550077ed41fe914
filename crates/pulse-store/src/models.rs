//! Cache record structs persisted in the local SQLite database.
//!
//! These mirror the table columns one to one.  Enum-ish fields stay in their
//! wire form (strings / ordinals) and are decoded into domain enums by the
//! mapper layer, so an unknown value written by a newer server survives a
//! round trip through the cache untouched.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// A cached news article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub image_url: Option<String>,
    /// Wire value; decoded via `NewsCategory::from_value` on the way out.
    pub category: String,
    pub is_verified: bool,
    pub content_hash: Option<String>,
    pub likes_count: i32,
    pub comments_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
    /// False only for rows created optimistically by the outbox.
    pub is_synced: bool,
    /// Epoch millis of the last remote write into this row.
    pub fetched_at: i64,
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// A cached alert.  Location is flattened into nullable columns; the mapper
/// reassembles it only when both coordinates are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub severity: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub radius_meters: Option<i32>,
    pub author_id: String,
    pub is_active: bool,
    pub expires_at: Option<i64>,
    pub created_at: i64,
    pub is_synced: bool,
    pub fetched_at: i64,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A cached user profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub wallet_address: Option<String>,
    pub token_balance: i64,
    pub reputation_score: i32,
    pub is_verified: bool,
    pub created_at: i64,
    /// At most one row has this set; enforced by the write helpers.
    pub is_current: bool,
    pub fetched_at: i64,
}

// ---------------------------------------------------------------------------
// Classified
// ---------------------------------------------------------------------------

/// A cached marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub currency: String,
    pub category: String,
    /// Comma-joined image references, split by the mapper.
    pub images: String,
    pub seller_id: String,
    pub seller_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub is_synced: bool,
    pub fetched_at: i64,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// A local-only draft.  `id` 0 means "not yet inserted".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftRecord {
    pub id: i64,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// A pending offline write awaiting network availability.
///
/// The payload is opaque JSON to the store; the data layer defines the
/// operation shapes and replays them in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboxEntry {
    pub id: i64,
    /// Sent with the replayed request so the server can deduplicate retries.
    pub idempotency_key: String,
    pub operation: String,
    pub payload: String,
    /// Cache row created optimistically for this write, if any.
    pub provisional_id: Option<String>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: i64,
}
