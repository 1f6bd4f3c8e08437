//! Database migration command.
//!
//! Migrations are embedded in the store crate and applied here explicitly;
//! the server never runs them at startup.

use creamline_store::datastore::MIGRATOR;

use super::{CommandError, connect};

/// Run all pending database migrations.
pub async fn run() -> Result<(), CommandError> {
    let data = connect().await?;

    tracing::info!("Running database migrations...");
    MIGRATOR.run(data.pool()).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
