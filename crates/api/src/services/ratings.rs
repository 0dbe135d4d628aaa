//! Rating submission and aggregation.

use std::collections::BTreeMap;

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use store_ratings_core::{AverageRating, RatingValue, StoreId, UserId};

use crate::db::{RatingRepository, RepositoryError, StoreRepository};
use crate::models::{OwnerRatings, RatingInput, RatingWrite, ValidationErrors};

/// Errors that can occur while rating stores.
#[derive(Debug, Error)]
pub enum RatingServiceError {
    /// The submission is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The store doesn't exist.
    #[error("store not found")]
    StoreNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A stored rating with the store's fresh average.
#[derive(Debug, Clone)]
pub struct RatingSubmission {
    pub write: RatingWrite,
    pub average_rating: AverageRating,
}

/// Rating service.
pub struct RatingService<'a> {
    stores: StoreRepository<'a>,
    ratings: RatingRepository<'a>,
}

impl<'a> RatingService<'a> {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            stores: StoreRepository::new(pool),
            ratings: RatingRepository::new(pool),
        }
    }

    /// Record `user_id`'s rating of a store, replacing any earlier one.
    ///
    /// The value is checked before storage is touched. The returned average
    /// is recomputed after the write.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::Validation` for a bad store id or a value outside 1-5.
    /// Returns `RatingServiceError::StoreNotFound` if the store doesn't exist.
    #[instrument(
        skip(self, input),
        fields(store_id = tracing::field::Empty, rating = tracing::field::Empty)
    )]
    pub async fn submit(
        &self,
        user_id: UserId,
        input: &RatingInput,
    ) -> Result<RatingSubmission, RatingServiceError> {
        let (store_id, value) = input.validate()?;
        tracing::Span::current()
            .record("store_id", store_id.as_i32())
            .record("rating", value.get());

        if !self.stores.exists(store_id).await? {
            return Err(RatingServiceError::StoreNotFound);
        }

        let write = self
            .ratings
            .upsert(user_id, store_id, value)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => RatingServiceError::StoreNotFound,
                other => RatingServiceError::Repository(other),
            })?;
        let average_rating = self.ratings.average_for_store(store_id).await?;

        tracing::info!(
            inserted = write.inserted,
            average_rating = average_rating.rounded(),
            "Rating recorded"
        );
        Ok(RatingSubmission {
            write,
            average_rating,
        })
    }

    /// Current average of one store.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::StoreNotFound` if the store doesn't exist.
    pub async fn store_average(&self, store_id: StoreId) -> Result<AverageRating, RatingServiceError> {
        if !self.stores.exists(store_id).await? {
            return Err(RatingServiceError::StoreNotFound);
        }
        Ok(self.ratings.average_for_store(store_id).await?)
    }

    /// The caller's own ratings, keyed by store.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::Repository` if the query fails.
    pub async fn for_user(
        &self,
        user_id: UserId,
    ) -> Result<BTreeMap<StoreId, RatingValue>, RatingServiceError> {
        Ok(self.ratings.for_user(user_id).await?)
    }

    /// Everything the owner's stores received, with the overall mean.
    ///
    /// An owner without stores or ratings gets an empty list and a zero mean.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::Repository` if the query fails.
    pub async fn owner_view(&self, owner_id: UserId) -> Result<OwnerRatings, RatingServiceError> {
        let received = self.ratings.received_by_owner(owner_id).await?;
        Ok(OwnerRatings::from_ratings(received))
    }
}
