use crate::handlers::{
    analytics::log_event,
    auth::{login, me, signup},
    crop_rules::{create_rule, delete_rule, list_rules, update_rule},
    guidance::{live_crops, season_now},
    health::health_check,
    places::{geocode, list_cached_places},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // Auth routes
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/me", get(me))
        // Analytics (auth optional)
        .route("/analytics/event", post(log_event))
        // Admin crop rule CRUD routes
        .route("/admin/crop_rules", get(list_rules))
        .route("/admin/crop_rules", post(create_rule))
        .route("/admin/crop_rules/:rule_id", put(update_rule))
        .route("/admin/crop_rules/:rule_id", delete(delete_rule))
        // Places and guidance
        .route("/geocode", get(geocode))
        .route("/states", get(list_cached_places))
        .route("/season_now", get(season_now))
        .route("/live_crops", get(live_crops))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
