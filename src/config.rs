use std::sync::Arc;

use anyhow::Result;
use sea_orm::Database;

use crate::auth::{AuthService, SystemTimeSource, TimeSource};
use crate::schemas::AppState;
use crate::weather::WeatherClient;

/// Process configuration, read from the environment exactly once at
/// startup and handed to the components that need it. Nothing reads the
/// environment after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HMAC secret for signing access tokens.
    pub secret_key: String,
    /// OpenWeather API key; `None` leaves the weather endpoints failing
    /// with a configuration error.
    pub openweather_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let secret_key = std::env::var("CROPWISE_SECRET").unwrap_or_else(|_| {
            tracing::warn!("CROPWISE_SECRET not set, using insecure default!");
            "dev-secret-change-me".to_string()
        });

        let openweather_api_key = std::env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Self {
            secret_key,
            openweather_api_key,
        }
    }
}

/// Initialize application state from configuration
pub async fn initialize_app_state(database_url: &str, config: AppConfig) -> Result<AppState> {
    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let weather = Arc::new(WeatherClient::new(config.openweather_api_key.clone())?);
    let auth = Arc::new(AuthService::new(config.secret_key, clock.clone()));

    Ok(AppState {
        db,
        weather,
        auth,
        clock,
    })
}
