//! Image store client
//!
//! Relays uploaded listing images to S3 and hands back the public object URL
//! the listing payload references from then on.

use anyhow::{Result, anyhow};
use aws_sdk_s3::primitives::ByteStream;
use std::env;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Image store configuration
#[derive(Debug, Clone)]
pub struct ImageStoreConfig {
    /// Bucket receiving listing images
    pub bucket: String,
    /// Public base URL the stored objects are served from
    pub public_base_url: String,
}

impl ImageStoreConfig {
    /// Create a new ImageStoreConfig from environment variables
    pub fn from_env() -> Self {
        let bucket =
            env::var("IMAGE_BUCKET_NAME").unwrap_or_else(|_| "listing-images".to_string());

        let public_base_url = env::var("IMAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        Self {
            bucket,
            public_base_url,
        }
    }
}

/// S3-backed store for listing images
#[derive(Debug, Clone)]
pub struct ImageStore {
    s3_client: aws_sdk_s3::Client,
    config: ImageStoreConfig,
}

impl ImageStore {
    /// Create a new image store
    pub fn new(s3_client: aws_sdk_s3::Client, config: ImageStoreConfig) -> Self {
        Self { s3_client, config }
    }

    /// Upload one image and return its public URL
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let key = object_key(file_name);

        self.s3_client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| anyhow!("Image upload failed: {}", e))?;

        let url = format!("{}/{}", self.config.public_base_url, key);
        info!("Uploaded image {} -> {}", file_name, url);

        Ok(url)
    }
}

/// Build a collision-free object key, keeping the original extension
fn object_key(file_name: &str) -> String {
    let id = Uuid::new_v4();
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("listings/{}.{}", id, ext.to_lowercase()),
        _ => format!("listings/{}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension() {
        let key = object_key("photo.PNG");
        assert!(key.starts_with("listings/"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_object_key_without_extension() {
        let key = object_key("photo");
        assert!(key.starts_with("listings/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_object_keys_are_unique() {
        assert_ne!(object_key("a.jpg"), object_key("a.jpg"));
    }
}
