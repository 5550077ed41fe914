//! Domain model structs and closed enums.
//!
//! Every struct derives `Serialize`/`Deserialize` so it can be handed directly
//! to a presentation layer over IPC.  Timestamps are epoch milliseconds.
//!
//! Enum wire values go through a closed `from_value` lookup with a fallback
//! constant: unknown values sent by a newer server degrade to a default
//! instead of failing the whole decode.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// A news article in the community feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct News {
    /// Globally unique, immutable after creation.
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub image_url: Option<String>,
    pub category: NewsCategory,
    pub is_verified: bool,
    /// Opaque content-integrity token, if the server published one.
    pub content_hash: Option<String>,
    pub likes_count: i32,
    pub comments_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Local,
    Events,
    Community,
    Government,
    Sports,
    Other,
}

impl NewsCategory {
    pub fn value(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Events => "events",
            Self::Community => "community",
            Self::Government => "government",
            Self::Sports => "sports",
            Self::Other => "other",
        }
    }

    /// Closed lookup; unknown wire values fall back to [`NewsCategory::Other`].
    pub fn from_value(value: &str) -> Self {
        match value {
            "local" => Self::Local,
            "events" => Self::Events,
            "community" => Self::Community,
            "government" => Self::Government,
            "sports" => Self::Sports,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// A safety alert.
///
/// An alert whose `expires_at` lies in the past is deactivated lazily the next
/// time the alert cache is refreshed; there is no timer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: AlertType,
    pub severity: AlertSeverity,
    pub location: Option<Location>,
    pub author_id: String,
    pub is_active: bool,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Emergency,
    Warning,
    Info,
}

impl AlertType {
    pub fn value(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Closed lookup; unknown wire values fall back to [`AlertType::Info`].
    pub fn from_value(value: &str) -> Self {
        match value {
            "emergency" => Self::Emergency,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

/// Ordinal severity, 1 (low) to 5 (extreme).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
    Extreme,
}

impl AlertSeverity {
    pub fn level(&self) -> i32 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
            Self::Extreme => 5,
        }
    }

    /// Closed lookup; out-of-range levels fall back to [`AlertSeverity::Low`].
    pub fn from_level(level: i32) -> Self {
        match level {
            2 => Self::Medium,
            3 => Self::High,
            4 => Self::Critical,
            5 => Self::Extreme,
            _ => Self::Low,
        }
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Pure value type, no independent identity.  Never partially populated: a
/// record either has both coordinates or no location at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub radius_meters: Option<i32>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user profile.  At most one cached user carries the current-user marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub wallet_address: Option<String>,
    /// Non-negative.
    pub token_balance: i64,
    pub reputation_score: i32,
    pub is_verified: bool,
    pub created_at: i64,
}

// ---------------------------------------------------------------------------
// Classified
// ---------------------------------------------------------------------------

/// A marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classified {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    /// ISO currency code, e.g. "KES".
    pub currency: String,
    pub category: ClassifiedCategory,
    /// Ordered image references.
    pub images: Vec<String>,
    pub seller_id: String,
    pub seller_name: String,
    pub location: Option<Location>,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClassifiedCategory {
    ForSale,
    Wanted,
    Services,
    Jobs,
    Housing,
    Vehicles,
    Other,
}

impl ClassifiedCategory {
    pub fn value(&self) -> &'static str {
        match self {
            Self::ForSale => "for_sale",
            Self::Wanted => "wanted",
            Self::Services => "services",
            Self::Jobs => "jobs",
            Self::Housing => "housing",
            Self::Vehicles => "vehicles",
            Self::Other => "other",
        }
    }

    /// Closed lookup; unknown wire values fall back to
    /// [`ClassifiedCategory::Other`].
    pub fn from_value(value: &str) -> Self {
        match value {
            "for_sale" => Self::ForSale,
            "wanted" => Self::Wanted,
            "services" => Self::Services,
            "jobs" => Self::Jobs,
            "housing" => Self::Housing,
            "vehicles" => Self::Vehicles,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Local-only staging buffer for content not yet submitted.  Never synced;
/// deleted by the caller once the submission succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    /// Locally assigned, monotonic (SQLite rowid).
    pub id: i64,
    pub kind: DraftType,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DraftType {
    News,
    Alert,
    Classified,
}

impl DraftType {
    pub fn value(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Alert => "alert",
            Self::Classified => "classified",
        }
    }

    pub fn from_value(value: &str) -> Self {
        match value {
            "alert" => Self::Alert,
            "classified" => Self::Classified,
            _ => Self::News,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_category_fallback() {
        assert_eq!(NewsCategory::from_value("sports"), NewsCategory::Sports);
        assert_eq!(NewsCategory::from_value("unknown_value"), NewsCategory::Other);
        assert_eq!(NewsCategory::from_value(""), NewsCategory::Other);
    }

    #[test]
    fn alert_type_fallback() {
        assert_eq!(AlertType::from_value("emergency"), AlertType::Emergency);
        assert_eq!(AlertType::from_value("drill"), AlertType::Info);
    }

    #[test]
    fn alert_severity_fallback() {
        assert_eq!(AlertSeverity::from_level(5), AlertSeverity::Extreme);
        assert_eq!(AlertSeverity::from_level(99), AlertSeverity::Low);
        assert_eq!(AlertSeverity::from_level(0), AlertSeverity::Low);
    }

    #[test]
    fn severity_levels_round_trip() {
        for level in 1..=5 {
            assert_eq!(AlertSeverity::from_level(level).level(), level);
        }
    }

    #[test]
    fn classified_category_fallback() {
        assert_eq!(
            ClassifiedCategory::from_value("for_sale"),
            ClassifiedCategory::ForSale
        );
        assert_eq!(
            ClassifiedCategory::from_value("free_stuff"),
            ClassifiedCategory::Other
        );
    }

    #[test]
    fn draft_type_defaults_to_news() {
        assert_eq!(DraftType::from_value("classified"), DraftType::Classified);
        assert_eq!(DraftType::from_value("poem"), DraftType::News);
    }
}
