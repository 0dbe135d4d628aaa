//! User repository for database operations.
//!
//! Accounts are created only through [`UserRepository::create_reserved`], which
//! reserves the id and inserts the row in one serialized transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{Email, Role, UserId};

use super::{RepositoryError, like_pattern};
use crate::models::user::{NewUser, User};

/// Advisory lock key serializing identity reservation.
///
/// The bytes spell `users_id`; every registration path takes the same key.
pub const REGISTRATION_LOCK_KEY: i64 = 0x7573_6572_735f_6964;

const USER_COLUMNS: &str = "id, name, email, address, role, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for login lookups.
#[derive(Debug, sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Whether an account already uses this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Get a user together with their password hash, by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user = User::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    /// Get a user's password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(hash)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List users, optionally filtered by role and a search term.
    ///
    /// The search term matches name, email or address, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        role: Option<Role>,
        search: Option<&str>,
    ) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::text IS NULL
                   OR name ILIKE $2 OR email ILIKE $2 OR address ILIKE $2)
            ORDER BY id
            "
        ))
        .bind(role)
        .bind(search.map(like_pattern))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Reserve a fresh id and insert the user under it.
    ///
    /// Runs in one transaction holding [`REGISTRATION_LOCK_KEY`]:
    ///
    /// 1. take the transaction-scoped advisory lock
    /// 2. re-check the email under the lock
    /// 3. draw the next value of the `users.id` sequence
    /// 4. insert the row with that id
    ///
    /// Any error drops the transaction, which rolls it back and releases the
    /// lock. The unique index on `email` backs the re-check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_reserved(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REGISTRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(user.email.as_str())
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let next_id = sqlx::query_scalar::<_, i64>(
            "SELECT nextval(pg_get_serial_sequence('users', 'id'))",
        )
        .fetch_one(&mut *tx)
        .await?;
        let id = i32::try_from(next_id).map_err(|_| {
            RepositoryError::DataCorruption(format!("user id {next_id} exceeds column range"))
        })?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (id, name, email, password_hash, address, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(password_hash)
        .bind(&user.address)
        .bind(user.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "email"))?;

        // Convert before committing so an unreadable row is never kept.
        let created = User::try_from(row)?;
        tx.commit().await?;

        Ok(created)
    }
}
