//! Payment routes: order capture and receipt verification

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::{error, info};

use crate::{error::ApiError, payments::{GatewayError, PaymentReceipt}, state::AppState};

/// Create a payable order for the listing fee
pub async fn capture_payment(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .payment_gateway
        .create_order()
        .await
        .map_err(|e| match e {
            GatewayError::NotPermitted => ApiError::NotPermitted,
            GatewayError::Transport(err) => {
                error!("Failed to create payable order: {}", err);
                ApiError::InternalServerError
            }
        })?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "currency": order.currency,
            "amount": order.amount,
            "id": order.id,
        },
    })))
}

/// Verify a payment completion receipt
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(receipt): Json<PaymentReceipt>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.payment_gateway.verify(&receipt) {
        return Err(ApiError::BadRequest(
            "Payment verification failed".to_string(),
        ));
    }

    info!("Payment {} verified for order {}", receipt.payment_id, receipt.order_id);

    Ok(Json(json!({
        "success": true,
        "message": "Payment verified",
    })))
}
