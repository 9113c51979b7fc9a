use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use model::entities::crop_rule;
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, error, info, trace};

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");
    debug!("Database URL: {}", database_url);

    let db: DatabaseConnection = match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    match Migrator::up(&db, None).await {
        Ok(_) => {
            info!("Database migrations completed successfully");
            debug!("All pending migrations have been applied");
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            return Err(e.into());
        }
    }

    // A fresh database gets the stock crop rules so it can score crops
    // before an administrator has configured anything
    info!("Seeding default crop rules");
    if let Err(e) = crop_rule::Model::seed_defaults(&db).await {
        error!("Failed to seed default crop rules: {}", e);
        return Err(e.into());
    }

    info!("Database initialization completed successfully!");

    Ok(())
}
