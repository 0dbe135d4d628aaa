//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Submitted account details are malformed.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The current password given for a password change is wrong.
    #[error("current password is incorrect")]
    IncorrectPassword,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
