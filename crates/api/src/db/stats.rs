//! Platform-wide counters for the admin dashboard.

use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

/// Row counts of the three main tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// Repository for aggregate counts.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count users, stores and ratings in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<PlatformStats, RepositoryError> {
        let stats = sqlx::query_as::<_, PlatformStats>(
            r"
            SELECT (SELECT COUNT(*) FROM users) AS total_users,
                   (SELECT COUNT(*) FROM stores) AS total_stores,
                   (SELECT COUNT(*) FROM ratings) AS total_ratings
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
