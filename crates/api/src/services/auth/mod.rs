//! Authentication service.
//!
//! Registration, password login and password changes. Passwords are hashed
//! with Argon2id and never leave this module in clear or hashed form.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use store_ratings_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{User, UserInput, ValidationErrors};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length.
const MAX_PASSWORD_LENGTH: usize = 100;

/// Who is creating an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registrar {
    /// Anyone, through public sign-up. Cannot grant `Admin`.
    Public,
    /// An administrator, through user management or the CLI.
    Admin,
}

/// Authentication service.
///
/// Handles user registration, login, and password changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Create an account with a reserved unique id.
    ///
    /// Input is validated in full before storage is touched. The email
    /// pre-check answers duplicates without hashing; the reservation
    /// transaction re-checks under its lock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is malformed.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::Repository` if the transaction fails; nothing is stored.
    #[instrument(skip_all, fields(registrar = ?registrar))]
    pub async fn register(&self, input: &UserInput, registrar: Registrar) -> Result<User, AuthError> {
        let mut errors = ValidationErrors::default();
        let new_user = input.profile(&mut errors);
        validate_password(&mut errors, "password", &input.password);
        if registrar == Registrar::Public
            && new_user.as_ref().is_some_and(|u| u.role == Role::Admin)
        {
            errors.add("role", "Admin accounts can only be created by an administrator");
        }
        let new_user = errors.finish_with(new_user)?;

        if self.users.email_exists(&new_user.email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create_reserved(&new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &password_hash)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Change a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IncorrectPassword` if `current` doesn't match; the
    /// stored hash is left unchanged.
    /// Returns `AuthError::Validation` if `new` is too short or too long.
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    #[instrument(skip(self, current, new))]
    pub async fn update_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let mut errors = ValidationErrors::default();
        if current.is_empty() {
            errors.add("oldPassword", "current password is required");
        }
        validate_password(&mut errors, "newPassword", new);
        errors.finish()?;

        let stored = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current, &stored).map_err(|_| AuthError::IncorrectPassword)?;

        let password_hash = hash_password(new)?;
        self.users
            .update_password(user_id, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, "Password updated");
        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(errors: &mut ValidationErrors, field: &'static str, password: &str) {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    } else if len > MAX_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("Password must be at most {MAX_PASSWORD_LENGTH} characters"),
        );
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
