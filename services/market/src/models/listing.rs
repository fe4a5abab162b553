//! Listing models for the market service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::models::UserRecord;

/// Geocoded listing location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingLocation {
    pub city: String,
    pub state: String,
    pub neighbourhood: String,
    /// `[latitude, longitude]`, `[0.0, 0.0]` when geocoding failed
    pub coordinates: [f64; 2],
}

/// Owner snapshot captured at creation time, not resynced afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedBy {
    pub name: String,
    pub member_since: String,
}

/// One recorded visit to a listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub user_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}

/// Listing record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub brand: String,
    /// Stored without thousands separators
    pub price: String,
    pub user_id: Uuid,
    pub category: String,
    pub subcategory: String,
    pub images: Vec<String>,
    pub state: String,
    pub city: String,
    pub features: serde_json::Value,
    pub location: ListingLocation,
    pub posted_by: PostedBy,
    pub is_expired: bool,
    /// Pre-formatted display date, `%d %b %Y`
    pub expiry_date: String,
    pub views: Vec<ViewRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A listing with its owner resolved inline
#[derive(Debug, Clone, Serialize)]
pub struct ListingWithOwner {
    #[serde(flatten)]
    pub listing: Listing,
    pub user: Option<UserRecord>,
}

/// A field the web client submits either JSON-encoded or already structured
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JsonField<T> {
    Encoded(String),
    Structured(T),
}

impl<T: DeserializeOwned> JsonField<T> {
    /// Normalize into the structured representation. A malformed encoded
    /// string is an error the caller must surface.
    pub fn normalize(self) -> Result<T, serde_json::Error> {
        match self {
            JsonField::Encoded(raw) => serde_json::from_str(&raw),
            JsonField::Structured(value) => Ok(value),
        }
    }
}

/// Request body for listing creation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub brand: String,
    #[serde(default)]
    pub price: Option<String>,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub neighbourhood: Option<String>,
    #[serde(default)]
    pub features: Option<JsonField<serde_json::Value>>,
    pub category: String,
    pub sub_category: String,
    #[serde(default)]
    pub photos: Option<JsonField<Vec<String>>>,
}

/// Request body for listing update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[serde(default)]
    pub listing_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub brand: String,
    #[serde(default)]
    pub price: Option<String>,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub neighbourhood: Option<String>,
    #[serde(default)]
    pub features: Option<JsonField<serde_json::Value>>,
    pub category: String,
    pub sub_category: String,
    #[serde(default)]
    pub photos: Option<JsonField<Vec<String>>>,
}

/// Response for listing creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingResponse {
    pub success: bool,
    pub message: String,
    pub data: Listing,
    pub user_details: Option<UserRecord>,
}

/// Response for listing update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingResponse {
    pub success: bool,
    pub message: String,
    pub updated_listing: ListingWithOwner,
}

/// Response for the full listing index
#[derive(Debug, Serialize)]
pub struct ListingsResponse {
    pub message: String,
    pub response: Vec<ListingWithOwner>,
}

/// Fields persisted when inserting a new listing
#[derive(Debug)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub price: String,
    pub user_id: Uuid,
    pub category: String,
    pub subcategory: String,
    pub images: Vec<String>,
    pub state: String,
    pub city: String,
    pub features: serde_json::Value,
    pub location: ListingLocation,
    pub posted_by: PostedBy,
    pub expiry_date: String,
}

/// Fields persisted when updating an existing listing
#[derive(Debug)]
pub struct ListingUpdate {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub price: String,
    pub category: String,
    pub subcategory: String,
    pub state: String,
    pub city: String,
    pub features: serde_json::Value,
    pub location: ListingLocation,
    pub is_expired: bool,
    /// Appended to the existing images when non-empty, never replacing them
    pub new_images: Vec<String>,
}
