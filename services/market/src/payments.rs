//! Payment gateway client
//!
//! Creates payable orders for the listing fee and verifies the completion
//! receipt the payment widget hands back. Receipts are authenticated with a
//! hex-encoded SHA-256 digest over the order and payment identifiers plus the
//! gateway secret.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Errors from the payment gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The gateway refused to open an order for this account
    #[error("Gateway refused the order")]
    NotPermitted,

    /// Transport or protocol failure talking to the gateway
    #[error("Gateway request failed: {0}")]
    Transport(#[from] anyhow::Error),
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

/// Payment gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway REST API
    pub base_url: String,
    /// API key identifier
    pub key_id: String,
    /// API key secret, also used to authenticate receipts
    pub key_secret: String,
    /// Listing fee in minor currency units
    pub listing_fee: u64,
    /// Listing fee currency code
    pub currency: String,
}

impl GatewayConfig {
    /// Create a new GatewayConfig from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("PAYMENT_GATEWAY_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());

        let key_id = env::var("PAYMENT_GATEWAY_KEY_ID")
            .map_err(|_| anyhow!("PAYMENT_GATEWAY_KEY_ID environment variable not set"))?;

        let key_secret = env::var("PAYMENT_GATEWAY_KEY_SECRET")
            .map_err(|_| anyhow!("PAYMENT_GATEWAY_KEY_SECRET environment variable not set"))?;

        let listing_fee = env::var("LISTING_FEE_AMOUNT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9900);

        let currency = env::var("LISTING_FEE_CURRENCY").unwrap_or_else(|_| "INR".to_string());

        Ok(Self {
            base_url,
            key_id,
            key_secret,
            listing_fee,
            currency,
        })
    }
}

/// HTTP client for the payment gateway
#[derive(Debug, Clone)]
pub struct PaymentGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl PaymentGateway {
    /// Create a new payment gateway client
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a payable order for the configured listing fee
    pub async fn create_order(&self) -> Result<PayableOrder, GatewayError> {
        let url = format!("{}/orders", self.config.base_url);
        let receipt = Uuid::new_v4().to_string();

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&serde_json::json!({
                "amount": self.config.listing_fee,
                "currency": self.config.currency,
                "receipt": receipt,
            }))
            .timeout(Duration::from_secs(15))
            .send()
            .await
            .map_err(|e| {
                error!("Order creation request failed: {}", e);
                GatewayError::Transport(anyhow!("order request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::NotPermitted);
        }
        if !status.is_success() {
            return Err(GatewayError::Transport(anyhow!(
                "gateway returned status {}",
                status
            )));
        }

        let order: PayableOrder = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(anyhow!("malformed order response: {}", e)))?;

        info!("Created payable order {}", order.id);
        Ok(order)
    }

    /// Check a completion receipt against the expected signature
    pub fn verify(&self, receipt: &PaymentReceipt) -> bool {
        let expected = sign_receipt(
            &receipt.order_id,
            &receipt.payment_id,
            &self.config.key_secret,
        );
        digest_eq(expected.as_bytes(), receipt.signature.as_bytes())
    }
}

/// Compare two byte strings through fresh digests so the comparison time does
/// not depend on where they first differ.
fn digest_eq(a: &[u8], b: &[u8]) -> bool {
    Sha256::digest(a) == Sha256::digest(b)
}

/// Compute the receipt signature: hex-encoded SHA-256 over
/// `orderId|paymentId|secret`.
pub fn sign_receipt(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(order_id.as_bytes());
    hasher.update(b"|");
    hasher.update(payment_id.as_bytes());
    hasher.update(b"|");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PaymentGateway {
        PaymentGateway::new(GatewayConfig {
            base_url: "http://localhost:0".to_string(),
            key_id: "key".to_string(),
            key_secret: "secret".to_string(),
            listing_fee: 9900,
            currency: "INR".to_string(),
        })
    }

    #[test]
    fn test_sign_receipt_is_stable_hex() {
        let sig = sign_receipt("order_1", "pay_1", "secret");
        assert_eq!(sig.len(), 64);
        assert_eq!(sig, sign_receipt("order_1", "pay_1", "secret"));
        assert_ne!(sig, sign_receipt("order_1", "pay_1", "other"));
    }

    #[test]
    fn test_verify_accepts_matching_signature() {
        let gw = gateway();
        let receipt = PaymentReceipt {
            order_id: "order_1".to_string(),
            payment_id: "pay_1".to_string(),
            signature: sign_receipt("order_1", "pay_1", "secret"),
        };
        assert!(gw.verify(&receipt));
    }

    #[test]
    fn test_verify_rejects_truncated_signature() {
        let gw = gateway();
        let mut signature = sign_receipt("order_1", "pay_1", "secret");
        signature.truncate(32);
        let receipt = PaymentReceipt {
            order_id: "order_1".to_string(),
            payment_id: "pay_1".to_string(),
            signature,
        };
        assert!(!gw.verify(&receipt));
    }

    #[test]
    fn test_verify_rejects_tampered_receipt() {
        let gw = gateway();
        let receipt = PaymentReceipt {
            order_id: "order_1".to_string(),
            payment_id: "pay_2".to_string(),
            signature: sign_receipt("order_1", "pay_1", "secret"),
        };
        assert!(!gw.verify(&receipt));
    }
}
