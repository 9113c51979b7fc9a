use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use model::entities::crop_rule;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace, warn};

use crate::config::{initialize_app_state, AppConfig};
use crate::router::create_router;

pub async fn serve(database_url: &str, bind_address: &str) -> Result<()> {
    trace!("Entering serve function");
    info!("CropWise application starting up");
    debug!("Database URL: {}", database_url);
    debug!("Bind address: {}", bind_address);

    // Read configuration once, up front
    let config = AppConfig::from_env();
    if config.openweather_api_key.is_none() {
        warn!("OPENWEATHER_API_KEY not set; weather-backed endpoints will return errors");
    }

    // Initialize application state
    trace!("Initializing application state");
    let state = match initialize_app_state(database_url, config).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    // Bring the schema up to date and seed the default crop rules on a
    // fresh database
    info!("Running database migrations");
    Migrator::up(&state.db, None).await?;
    crop_rule::Model::seed_defaults(&state.db).await?;

    // Create router
    trace!("Creating application router");
    let app = create_router(state);
    debug!("Router created successfully");

    // Start server
    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("CropWise API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
