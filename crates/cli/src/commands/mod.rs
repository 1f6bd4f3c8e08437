//! CLI command implementations.

pub mod migrate;
pub mod orders;
pub mod reviews;
pub mod seed;

use creamline_store::config::{ConfigError, StoreConfig};
use creamline_store::datastore::{self, DataError, PostgresDataService};

/// Errors shared by the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to the configured database and wrap it in the data service.
pub async fn connect() -> Result<PostgresDataService, CommandError> {
    let config = StoreConfig::from_env()?;
    let pool = datastore::create_pool(&config.database_url).await?;
    Ok(PostgresDataService::new(pool))
}
