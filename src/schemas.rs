use std::fmt;
use std::sync::Arc;

use agronomy::{Season, SuitabilityTag, WeatherMetrics};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::auth::{AuthService, TimeSource};
use crate::weather::WeatherClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Upstream weather API client
    pub weather: Arc<WeatherClient>,
    /// Token issuance and verification
    pub auth: Arc<AuthService>,
    /// Wall-clock source; injectable so tests can pin time
    pub clock: Arc<dyn TimeSource>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::analytics::log_event,
        crate::handlers::crop_rules::list_rules,
        crate::handlers::crop_rules::create_rule,
        crate::handlers::crop_rules::update_rule,
        crate::handlers::crop_rules::delete_rule,
        crate::handlers::places::geocode,
        crate::handlers::places::list_cached_places,
        crate::handlers::guidance::season_now,
        crate::handlers::guidance::live_crops,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::auth::SignupRequest,
            crate::handlers::auth::LoginForm,
            crate::handlers::auth::Token,
            crate::handlers::auth::MeResponse,
            crate::handlers::analytics::EventIn,
            crate::handlers::analytics::EventAck,
            crate::handlers::crop_rules::CropRuleIn,
            crate::handlers::crop_rules::CropRuleOut,
            crate::handlers::crop_rules::DeleteAck,
            crate::handlers::places::GeocodeCandidate,
            crate::handlers::places::CachedPlace,
            crate::handlers::guidance::SeasonNowResponse,
            crate::handlers::guidance::LiveCropsResponse,
            crate::handlers::guidance::CropSuitability,
            crate::handlers::guidance::RuleBounds,
            WeatherMetrics,
            Season,
            SuitabilityTag,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Signup, login and identity"),
        (name = "analytics", description = "Best-effort event logging"),
        (name = "admin", description = "Crop rule administration"),
        (name = "data", description = "Geocoding, seasons and crop guidance"),
    ),
    info(
        title = "CropWise API",
        description = "Real-Time Crop Calendar & Guidance System - scores crops against live weather for a location and season",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme the protected paths reference.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
