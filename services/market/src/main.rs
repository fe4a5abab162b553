use anyhow::Result;
use aws_config::BehaviorVersion;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use market::geocode::{GeocodeClient, GeocodeConfig};
use market::middleware::JwtConfig;
use market::payments::{GatewayConfig, PaymentGateway};
use market::repositories::{UserRepository, listing::ListingRepository};
use market::routes;
use market::state::AppState;
use market::uploads::{ImageStore, ImageStoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting market service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize the S3 client for image storage
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);

    // Initialize repositories and external service clients
    let listing_repository = ListingRepository::new(pool.clone());
    let user_repository = UserRepository::new(pool.clone());
    let geocoder = GeocodeClient::new(GeocodeConfig::from_env());
    let payment_gateway = PaymentGateway::new(GatewayConfig::from_env()?);
    let image_store = ImageStore::new(s3_client, ImageStoreConfig::from_env());
    let jwt_config = JwtConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    info!("Market service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        listing_repository,
        user_repository,
        geocoder,
        payment_gateway,
        image_store,
        jwt_config,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3002").await?;
    info!("Market service listening on 0.0.0.0:3002");

    axum::serve(listener, app).await?;

    Ok(())
}
