//! Application state shared across handlers

use sqlx::PgPool;

use crate::geocode::GeocodeClient;
use crate::middleware::JwtConfig;
use crate::payments::PaymentGateway;
use crate::repositories::{UserRepository, listing::ListingRepository};
use crate::uploads::ImageStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub listing_repository: ListingRepository,
    pub user_repository: UserRepository,
    pub geocoder: GeocodeClient,
    pub payment_gateway: PaymentGateway,
    pub image_store: ImageStore,
    pub jwt_config: JwtConfig,
}
