pub mod user;
pub mod event;
pub mod participant;

use crate::{config::Config, PGPool};
use log::info;
use sqlx::{migrate::MigrateError, postgres::PgPoolOptions};

pub async fn init_db_pool(config: &Config) -> Result<PGPool, sqlx::Error> {
    let pool: PGPool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("connected to postgresql (max {} connections)", config.db_max_connections);
    Ok(pool)
}

pub async fn run_migrations(pool: &PGPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}
