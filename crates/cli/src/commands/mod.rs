//! Subcommand implementations.

pub mod migrate;
pub mod refund;
pub mod report;
pub mod seed;

use sqlx::PgPool;

use storekeep_db::StoreConfig;

/// Load configuration from the environment and open a connection pool.
async fn connect() -> Result<(StoreConfig, PgPool), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let pool = storekeep_db::create_pool(&config.database_url, &config.pool).await?;
    tracing::info!("Connected to database");

    Ok((config, pool))
}
