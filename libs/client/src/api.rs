//! Typed API client for the market service
//!
//! [`MarketBackend`] is the seam the orchestrator drives; [`ApiClient`] is
//! its HTTP implementation against the market service wire contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forms::{FileAttachment, ListingPayload};

/// Errors surfaced by the client SDK
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server refused the action for this account
    #[error("You can't do this action.")]
    NotPermitted,

    /// Transport failure before a usable response arrived
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a failure message
    #[error("{0}")]
    Api(String),
}

/// A gateway-issued order awaiting payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayableOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// Completion receipt reported by the payment widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Server response to a successful listing creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCreated {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub user_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    success: bool,
    #[serde(default)]
    data: Option<PayableOrder>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// The calls the listing-creation workflow needs from the server
#[async_trait]
pub trait MarketBackend: Send + Sync {
    /// Upload one raw file, returning its public URL
    async fn upload_image(&self, file: &FileAttachment) -> Result<String, ClientError>;

    /// Open a payable order for the listing fee
    async fn create_order(&self) -> Result<PayableOrder, ClientError>;

    /// Verify a payment completion receipt
    async fn verify_payment(&self, receipt: &PaymentReceipt) -> Result<(), ClientError>;

    /// Submit the finalized listing payload
    async fn create_listing(&self, payload: &ListingPayload) -> Result<ListingCreated, ClientError>;

    /// Submit an update to an existing listing
    async fn update_listing(&self, payload: &ListingPayload) -> Result<(), ClientError>;
}

/// HTTP client for the market service
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Create a new API client with a bearer token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl MarketBackend for ApiClient {
    async fn upload_image(&self, file: &FileAttachment) -> Result<String, ClientError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response: UploadResponse = self
            .http
            .post(self.url("/image/upload"))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match (response.success, response.url) {
            (true, Some(url)) => Ok(url),
            _ => Err(ClientError::Api(
                response
                    .message
                    .unwrap_or_else(|| "Upload failed".to_string()),
            )),
        }
    }

    async fn create_order(&self) -> Result<PayableOrder, ClientError> {
        let response = self
            .http
            .post(self.url("/payment/capture"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::NotPermitted);
        }

        let body: OrderResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match (body.success, body.data) {
            (true, Some(order)) => Ok(order),
            _ => Err(ClientError::Api(
                body.message
                    .unwrap_or_else(|| "Order creation failed".to_string()),
            )),
        }
    }

    async fn verify_payment(&self, receipt: &PaymentReceipt) -> Result<(), ClientError> {
        let body: VerifyResponse = self
            .http
            .post(self.url("/payment/verify"))
            .bearer_auth(&self.token)
            .json(receipt)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if body.success {
            Ok(())
        } else {
            Err(ClientError::Api(
                body.message
                    .unwrap_or_else(|| "Payment verification failed".to_string()),
            ))
        }
    }

    async fn create_listing(
        &self,
        payload: &ListingPayload,
    ) -> Result<ListingCreated, ClientError> {
        let response: ListingCreated = self
            .http
            .post(self.url("/listing/create"))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if response.success {
            Ok(response)
        } else {
            Err(ClientError::Api(response.message))
        }
    }

    async fn update_listing(&self, payload: &ListingPayload) -> Result<(), ClientError> {
        let body: UpdateResponse = self
            .http
            .put(self.url("/listing/update"))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if body.success {
            Ok(())
        } else {
            Err(ClientError::Api(
                body.message
                    .unwrap_or_else(|| "Listing update failed".to_string()),
            ))
        }
    }
}
