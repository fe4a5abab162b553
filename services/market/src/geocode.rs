//! Geocoding client
//!
//! Resolves a `(city, state)` pair to coordinates through a Nominatim-style
//! HTTP endpoint. Lookups are best-effort: callers degrade a failure to the
//! `[0, 0]` sentinel instead of failing the request.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

/// One result row from the geocoding endpoint
#[derive(Debug, Deserialize)]
struct GeocodeResult {
    lat: String,
    lon: String,
}

/// Geocoding client configuration
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Base URL of the geocoding endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocodeConfig {
    /// Create a new GeocodeConfig from environment variables
    pub fn from_env() -> Self {
        let base_url = env::var("GEOCODER_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        let timeout_secs = env::var("GEOCODER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Self {
            base_url,
            timeout_secs,
        }
    }
}

/// HTTP client for coordinate lookups
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    config: GeocodeConfig,
}

impl GeocodeClient {
    /// Create a new geocoding client
    pub fn new(config: GeocodeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Resolve a city/state pair to `(latitude, longitude)`
    pub async fn lookup(&self, city: &str, state: &str) -> Result<(f64, f64)> {
        let query = format!("{}, {}", city.trim(), state.trim());
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.config.base_url,
            urlencoding::encode(&query)
        );

        debug!("Geocoding location: {}", query);

        let results: Vec<GeocodeResult> = self
            .http
            .get(&url)
            .header("User-Agent", "Soko/1.0 (marketplace listings)")
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| anyhow!("Geocoding request failed: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Geocoding request rejected: {}", e))?
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse geocoding response: {}", e))?;

        let result = results.first().ok_or_else(|| {
            warn!(city = %city, state = %state, "Location not found by geocoding endpoint");
            anyhow!("Location not found: {}", query)
        })?;

        let lat: f64 = result
            .lat
            .parse()
            .map_err(|e| anyhow!("Invalid latitude in response: {}", e))?;
        let lon: f64 = result
            .lon
            .parse()
            .map_err(|e| anyhow!("Invalid longitude in response: {}", e))?;

        debug!("Geocoded {} -> ({}, {})", query, lat, lon);

        Ok((lat, lon))
    }
}
