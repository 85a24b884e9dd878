use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url()?);
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    // connects eagerly, so an unreachable database fails at startup
    let pool = Database::connect(options).await?;
    log::info!(
        "Connected to database {} at {}:{}",
        config.name,
        config.host,
        config.port
    );

    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    log::info!("Database migrations applied");
    Ok(())
}
