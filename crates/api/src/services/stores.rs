//! Store management.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use store_ratings_core::Role;

use crate::db::{RepositoryError, StoreRepository, UserRepository};
use crate::models::{Store, StoreInput, StoreSummary, ValidationErrors};

/// Errors that can occur while managing stores.
#[derive(Debug, Error)]
pub enum StoreServiceError {
    /// The store details are malformed, or the owner can't own stores.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// `owner_id` names no user.
    #[error("owner not found")]
    OwnerNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Store service.
pub struct StoreService<'a> {
    stores: StoreRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> StoreService<'a> {
    /// Create a new store service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            stores: StoreRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Create a store for an existing Owner.
    ///
    /// # Errors
    ///
    /// Returns `StoreServiceError::Validation` if a field is malformed or the
    /// owner doesn't hold the Owner role.
    /// Returns `StoreServiceError::OwnerNotFound` if the owner doesn't exist.
    #[instrument(skip_all)]
    pub async fn create(&self, input: &StoreInput) -> Result<Store, StoreServiceError> {
        let new_store = input.validate()?;

        let owner = self
            .users
            .get_by_id(new_store.owner_id)
            .await?
            .ok_or(StoreServiceError::OwnerNotFound)?;
        if owner.role != Role::Owner {
            return Err(ValidationErrors::single(
                "owner_id",
                format!("user {} has role {}, expected Owner", owner.id, owner.role),
            )
            .into());
        }

        let store = self.stores.create(&new_store).await.map_err(|e| match e {
            RepositoryError::NotFound => StoreServiceError::OwnerNotFound,
            other => StoreServiceError::Repository(other),
        })?;

        tracing::info!(store_id = %store.id, owner_id = %store.owner_id, "Store created");
        Ok(store)
    }

    /// All stores with live aggregates, optionally filtered by a search term.
    ///
    /// # Errors
    ///
    /// Returns `StoreServiceError::Repository` if the query fails.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<StoreSummary>, StoreServiceError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.stores.list_with_ratings(search).await?)
    }
}
