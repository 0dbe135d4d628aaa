//! Admin user directory.

use sqlx::PgPool;

use store_ratings_core::{Role, UserId};

use crate::db::{RatingRepository, RepositoryError, UserRepository};
use crate::models::{User, UserDetail, UserFilter, ValidationErrors};

/// Errors from user directory lookups.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// The filter is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// No user with the requested ID.
    #[error("user not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read-only user listing for administrators.
pub struct UserService<'a> {
    users: UserRepository<'a>,
    ratings: RatingRepository<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            ratings: RatingRepository::new(pool),
        }
    }

    /// List users matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Validation` if the role filter names no role.
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserServiceError> {
        let role = match filter.role.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Role>()
                    .map_err(|e| ValidationErrors::single("role", e.to_string()))?,
            ),
        };
        let search = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

        Ok(self.users.list(role, search).await?)
    }

    /// One user; Owners also carry the mean rating across their stores.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` if the user doesn't exist.
    pub async fn detail(&self, id: UserId) -> Result<UserDetail, UserServiceError> {
        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound)?;

        let average_rating = if user.role == Role::Owner {
            Some(self.ratings.average_for_owner(user.id).await?)
        } else {
            None
        };

        Ok(UserDetail {
            user,
            average_rating,
        })
    }
}
