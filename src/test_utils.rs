#[cfg(test)]
pub mod test_utils {
    use crate::auth::{AuthService, SystemTimeSource, TimeSource};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::weather::WeatherClient;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Token-signing secret used by every test server.
    pub const TEST_SECRET: &str = "test-secret";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing. No weather API key is configured, so
    /// upstream-backed endpoints fail with a configuration error instead
    /// of reaching the network.
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
        let weather =
            Arc::new(WeatherClient::new(None).expect("Failed to build weather client"));
        let auth = Arc::new(AuthService::new(TEST_SECRET.to_string(), clock.clone()));

        AppState {
            db,
            weather,
            auth,
            clock,
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }
}
