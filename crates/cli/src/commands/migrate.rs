//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sr-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/api/migrations/` at build time.

use store_ratings_api::db::MIGRATOR;

use super::{CommandError, connect};

/// Apply every pending migration.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!(available = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
