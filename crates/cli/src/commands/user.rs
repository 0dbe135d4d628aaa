//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! sr-cli user create -n "Platform Administrator" -e admin@example.com \
//!     -p 's3cret!' -a "1 Main St" -r admin
//! ```
//!
//! Accounts go through the same validation and identity reservation as
//! `POST /users`, so this is the way to create the first administrator.

use store_ratings_api::models::UserInput;
use store_ratings_api::services::{AuthService, Registrar};
use store_ratings_core::UserId;

use super::{CommandError, connect};

/// Account details given on the command line.
#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: String,
}

/// Create a user account with any role.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create(account: NewAccount) -> Result<UserId, CommandError> {
    let pool = connect().await?;

    let input = UserInput {
        name: account.name,
        email: account.email,
        password: account.password,
        address: account.address,
        role: Some(account.role),
    };

    let user = AuthService::new(&pool)
        .register(&input, Registrar::Admin)
        .await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        role = %user.role,
        "User created successfully"
    );

    Ok(user.id)
}
