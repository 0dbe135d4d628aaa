//! Store repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{AverageRating, Email, StoreId, UserId};

use super::{RepositoryError, like_pattern};
use crate::models::store::{NewStore, Store, StoreSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    email: Option<String>,
    address: String,
    owner_id: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid store email in database: {e}"))
            })?;

        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            owner_id: UserId::new(row.owner_id),
            created_at: row.created_at,
        })
    }
}

/// Internal row type for the listing with live aggregates.
#[derive(Debug, sqlx::FromRow)]
struct StoreSummaryRow {
    #[sqlx(flatten)]
    store: StoreRow,
    average_rating: Option<f64>,
    rating_count: i64,
}

impl TryFrom<StoreSummaryRow> for StoreSummary {
    type Error = RepositoryError;

    fn try_from(row: StoreSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            store: Store::try_from(row.store)?,
            average_rating: AverageRating::from_mean(row.average_rating),
            rating_count: row.rating_count,
        })
    }
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether a store with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM stores WHERE id = $1)")
                .bind(id.as_i32())
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// List stores with their average rating and rating count.
    ///
    /// The optional search term matches name, address or email, ignoring case.
    /// Averages are computed on every call.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_ratings(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<StoreSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreSummaryRow>(
            r"
            SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
                   AVG(r.rating)::float8 AS average_rating,
                   COUNT(r.id) AS rating_count
            FROM stores s
            LEFT JOIN ratings r ON r.store_id = s.id
            WHERE $1::text IS NULL
               OR s.name ILIKE $1 OR s.address ILIKE $1 OR s.email ILIKE $1
            GROUP BY s.id
            ORDER BY s.name, s.id
            ",
        )
        .bind(search.map(like_pattern))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoreSummary::try_from).collect()
    }

    /// Insert a new store.
    ///
    /// The owner is assumed to have been checked by the caller; the foreign
    /// key still rejects a dangling `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, store: &NewStore) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, address, owner_id, created_at
            ",
        )
        .bind(&store.name)
        .bind(store.email.as_ref().map(Email::as_str))
        .bind(&store.address)
        .bind(store.owner_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Store::try_from(row)
    }
}
