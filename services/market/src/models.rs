//! API models for request and response payloads

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub mod listing;

/// A user row, including the denormalized cache of listings they own
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub product_listed: Vec<Uuid>,
}
