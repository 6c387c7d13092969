pub mod config;
pub mod error;

pub use config::{
    Config, FavoritesConfig, GeocodeConfig, MapCenter, RadarConfig, UiConfig, ValidationResult,
    WeatherConfig,
};
pub use error::{AppError, NetworkError, PersistenceError, WeatherError};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("EchoWx core initialized");
    Ok(())
}
