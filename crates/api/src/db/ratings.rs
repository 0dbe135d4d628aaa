//! Rating repository: the upsert and every aggregate over ratings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{AverageRating, RatingId, RatingValue, StoreId, UserId};

use super::RepositoryError;
use crate::models::rating::{Rating, RatingWrite, ReceivedRating};

/// Name `PostgreSQL` gives the inline `ratings.store_id` reference.
const STORE_REFERENCE: &str = "ratings_store_id_fkey";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for the upsert's `RETURNING` clause.
#[derive(Debug, sqlx::FromRow)]
struct RatingWriteRow {
    id: i32,
    user_id: i32,
    store_id: i32,
    rating: RatingValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    inserted: bool,
}

impl From<RatingWriteRow> for RatingWrite {
    fn from(row: RatingWriteRow) -> Self {
        Self {
            rating: Rating {
                id: RatingId::new(row.id),
                user_id: UserId::new(row.user_id),
                store_id: StoreId::new(row.store_id),
                rating: row.rating,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            inserted: row.inserted,
        }
    }
}

/// Internal row type for an owner's received ratings.
#[derive(Debug, sqlx::FromRow)]
struct ReceivedRatingRow {
    rating: RatingValue,
    user_name: String,
    store_id: i32,
    store_name: String,
}

impl From<ReceivedRatingRow> for ReceivedRating {
    fn from(row: ReceivedRatingRow) -> Self {
        Self {
            rating: row.rating,
            user_name: row.user_name,
            store_id: StoreId::new(row.store_id),
            store_name: row.store_name,
        }
    }
}

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the rating `user_id` gave `store_id`.
    ///
    /// A single statement keyed on the `(user_id, store_id)` unique index, so
    /// concurrent submissions for the same pair always leave exactly one row.
    /// `xmax = 0` holds only for a freshly inserted tuple.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors, including
    /// a rating author that no longer exists.
    pub async fn upsert(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<RatingWrite, RepositoryError> {
        let row = sqlx::query_as::<_, RatingWriteRow>(
            r"
            INSERT INTO ratings (user_id, store_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = now()
            RETURNING id, user_id, store_id, rating, created_at, updated_at,
                      (xmax = 0) AS inserted
            ",
        )
        .bind(user_id.as_i32())
        .bind(store_id.as_i32())
        .bind(value)
        .fetch_one(self.pool)
        .await
        .map_err(upsert_error)?;

        Ok(row.into())
    }

    /// Mean of every rating a store received; zero when it has none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn average_for_store(&self, store_id: StoreId) -> Result<AverageRating, RepositoryError> {
        let mean = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(rating)::float8 FROM ratings WHERE store_id = $1",
        )
        .bind(store_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(AverageRating::from_mean(mean))
    }

    /// The caller's own ratings, keyed by store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_user(
        &self,
        user_id: UserId,
    ) -> Result<BTreeMap<StoreId, RatingValue>, RepositoryError> {
        let rows = sqlx::query_as::<_, (i32, RatingValue)>(
            "SELECT store_id, rating FROM ratings WHERE user_id = $1",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(store_id, rating)| (StoreId::new(store_id), rating))
            .collect())
    }

    /// Every rating received by any store the owner owns, with the rater's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn received_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<ReceivedRating>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReceivedRatingRow>(
            r"
            SELECT r.rating, u.name AS user_name, s.id AS store_id, s.name AS store_name
            FROM ratings r
            JOIN stores s ON s.id = r.store_id
            JOIN users u ON u.id = r.user_id
            WHERE s.owner_id = $1
            ORDER BY s.id, r.updated_at DESC, r.id
            ",
        )
        .bind(owner_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ReceivedRating::from).collect())
    }

    /// Mean of every rating received across the owner's stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn average_for_owner(
        &self,
        owner_id: UserId,
    ) -> Result<AverageRating, RepositoryError> {
        let mean = sqlx::query_scalar::<_, Option<f64>>(
            r"
            SELECT AVG(r.rating)::float8
            FROM ratings r
            JOIN stores s ON s.id = r.store_id
            WHERE s.owner_id = $1
            ",
        )
        .bind(owner_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(AverageRating::from_mean(mean))
    }
}

/// Only a missing store is `NotFound`; a missing author stays a database error.
fn upsert_error(err: sqlx::Error) -> RepositoryError {
    let store_missing = matches!(
        &err,
        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation() && is_store_reference(db_err.constraint())
    );
    if store_missing {
        RepositoryError::NotFound
    } else {
        RepositoryError::Database(err)
    }
}

fn is_store_reference(constraint: Option<&str>) -> bool {
    constraint == Some(STORE_REFERENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_reference_means_store_missing() {
        assert!(is_store_reference(Some("ratings_store_id_fkey")));
        assert!(!is_store_reference(Some("ratings_user_id_fkey")));
        assert!(!is_store_reference(None));
    }

    #[test]
    fn test_non_database_errors_are_not_not_found() {
        assert!(matches!(
            upsert_error(sqlx::Error::RowNotFound),
            RepositoryError::Database(_)
        ));
    }
}
