//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use store_ratings_api::db::{self, RepositoryError};
use store_ratings_api::services::{AuthError, RatingServiceError, StoreServiceError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account creation was refused.
    #[error("User error: {0}")]
    Auth(#[from] AuthError),

    /// Store creation was refused.
    #[error("Store error: {0}")]
    Store(#[from] StoreServiceError),

    /// Rating was refused.
    #[error("Rating error: {0}")]
    Rating(#[from] RatingServiceError),

    /// Repository lookup failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    SeedFile {
        path: String,
        source: std::io::Error,
    },

    /// The seed file is not valid YAML of the expected shape.
    #[error("Invalid seed file: {0}")]
    SeedFormat(#[from] serde_yaml::Error),

    /// The seed file refers to a user or store it never defines.
    #[error("Seed file references unknown {kind}: {name}")]
    UnknownReference { kind: &'static str, name: String },
}

/// Connect to the database named by `API_DATABASE_URL` or `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("API_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
