//! Market service routes

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

pub mod listing;
pub mod payment;
pub mod upload;

/// Create the router for the market service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/listing", get(listing::get_all_listings))
        .route("/listing/mine", get(listing::get_my_listings))
        .route("/listing/create", post(listing::create_listing))
        .route("/listing/update", put(listing::update_listing))
        .route("/listing/:id/view", post(listing::record_view))
        .route("/payment/capture", post(payment::capture_payment))
        .route("/payment/verify", post(payment::verify_payment))
        .route("/image/upload", post(upload::upload_image))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "market-service"
    }))
}
