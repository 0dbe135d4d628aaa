//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use store_ratings_core::{AverageRating, Email, Role, UserId};

use super::validation::{ValidationErrors, required_email, required_text};

/// Maximum length of a display name.
pub const NAME_MAX_LENGTH: usize = 100;
/// Maximum length of a postal address.
pub const ADDRESS_MAX_LENGTH: usize = 255;

/// A registered account (domain type).
///
/// Never carries the password hash, so it is safe to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Lowercase email address.
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// Permission tier.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user as shown on the admin detail view.
///
/// Owners additionally carry the mean of every rating their stores received.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<AverageRating>,
}

/// Account details as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub address: String,
    /// Requested role; `None` means [`Role::User`].
    #[serde(default)]
    pub role: Option<String>,
}

/// Validated account details ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub address: String,
    pub role: Role,
}

impl UserInput {
    /// Check the profile fields (everything but the password).
    ///
    /// Problems are added to `errors`; `None` is returned when any field
    /// could not be parsed.
    pub fn profile(&self, errors: &mut ValidationErrors) -> Option<NewUser> {
        let name = required_text(errors, "name", &self.name, NAME_MAX_LENGTH);
        let email = required_email(errors, "email", &self.email);
        let address = required_text(errors, "address", &self.address, ADDRESS_MAX_LENGTH);
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => Some(Role::User),
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|e| errors.add("role", e.to_string()))
                .ok(),
        };

        Some(NewUser {
            name,
            email: email?,
            address,
            role: role?,
        })
    }
}

/// Filters for the admin user listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    /// Only users holding this role.
    pub role: Option<String>,
    /// Case-insensitive match against name, email or address.
    pub q: Option<String>,
}
