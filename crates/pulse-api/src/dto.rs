//! Wire records exchanged with the Pulse backend.
//!
//! Field names match the server's snake_case JSON.  Enum-ish fields stay as
//! plain strings/ordinals here; decoding into domain enums (with fallback)
//! happens in the mapper layer so unknown values never fail the decode.

use serde::{Deserialize, Serialize};

/// News article from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsDto {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub image_url: Option<String>,
    pub category: String,
    pub is_verified: bool,
    pub content_hash: Option<String>,
    pub likes_count: i32,
    pub comments_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Alert from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertDto {
    pub id: String,
    pub title: String,
    pub description: String,
    /// emergency / warning / info
    #[serde(rename = "type")]
    pub kind: String,
    /// 1-5
    pub severity: i32,
    pub location: Option<LocationDto>,
    pub author_id: String,
    pub is_active: bool,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}

/// Location payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationDto {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub radius_meters: Option<i32>,
}

/// User profile from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDto {
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
}

/// Classified listing from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub currency: String,
    pub category: String,
    pub images: Vec<String>,
    pub seller_id: String,
    pub seller_name: String,
    pub location: Option<LocationDto>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Body for `POST /news`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
}

/// Body for `POST /alerts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateAlertRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<i32>,
}
