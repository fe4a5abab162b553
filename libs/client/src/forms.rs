//! Listing form staging
//!
//! The form holds everything the user typed plus the raw files they attached.
//! Before submission the files are traded for URLs and the form becomes a
//! wire payload with `photos` and `features` JSON-encoded, the way the web
//! client submits them.

use serde::{Deserialize, Serialize};

/// A raw file attached to the form
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Staged listing form data
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub price: String,
    pub state: String,
    pub city: String,
    pub neighbourhood: String,
    pub category: String,
    pub sub_category: String,
    /// Free-form feature mapping; the upload flow may merge an `image` key
    pub features: serde_json::Value,
    /// Listing images, uploaded in selection order
    pub files: Vec<FileAttachment>,
    /// Optional image illustrating the features
    pub feature_file: Option<FileAttachment>,
}

/// Wire payload for listing creation and update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub price: String,
    pub state: String,
    pub city: String,
    pub neighbourhood: String,
    pub category: String,
    pub sub_category: String,
    /// JSON-encoded feature object
    pub features: String,
    /// JSON-encoded URL array, omitted when no upload succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
}

impl ListingForm {
    /// Build the wire payload from the staged form and the uploaded URLs
    pub fn into_payload(
        self,
        photo_urls: Vec<String>,
        feature_url: Option<String>,
    ) -> ListingPayload {
        let mut features = self.features;
        if let Some(url) = feature_url {
            if !features.is_object() {
                features = serde_json::json!({});
            }
            features["image"] = serde_json::Value::String(url);
        }

        let photos = if photo_urls.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&photo_urls).unwrap_or_else(|_| "[]".to_string()))
        };

        ListingPayload {
            title: self.title,
            description: self.description,
            brand: self.brand,
            price: self.price,
            state: self.state,
            city: self.city,
            neighbourhood: self.neighbourhood,
            category: self.category,
            sub_category: self.sub_category,
            features: serde_json::to_string(&features).unwrap_or_else(|_| "{}".to_string()),
            photos,
            listing_id: None,
        }
    }
}
