//! Store domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use store_ratings_core::{AverageRating, Email, StoreId, UserId};

use super::validation::{ValidationErrors, lenient_int, optional_email, required_text};
use crate::models::user::ADDRESS_MAX_LENGTH;

/// Maximum length of a store name.
pub const STORE_NAME_MAX_LENGTH: usize = 100;

/// A rateable store.
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: Option<Email>,
    pub address: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A store as listed publicly, with its live aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    #[serde(flatten)]
    pub store: Store,
    pub average_rating: AverageRating,
    pub rating_count: i64,
}

/// Store details as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(alias = "ownerId", default, deserialize_with = "lenient_int")]
    pub owner_id: Option<i64>,
}

/// Validated store details ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStore {
    pub name: String,
    pub email: Option<Email>,
    pub address: String,
    pub owner_id: UserId,
}

impl StoreInput {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns all field problems found.
    pub fn validate(&self) -> Result<NewStore, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = required_text(&mut errors, "name", &self.name, STORE_NAME_MAX_LENGTH);
        let email = optional_email(&mut errors, "email", self.email.as_deref());
        let address = required_text(&mut errors, "address", &self.address, ADDRESS_MAX_LENGTH);
        let owner_id = self
            .owner_id
            .filter(|id| *id > 0)
            .and_then(|id| i32::try_from(id).ok())
            .map(UserId::new);
        if owner_id.is_none() {
            errors.add("owner_id", "owner_id must be a positive integer");
        }

        let store = owner_id.map(|owner_id| NewStore {
            name,
            email,
            address,
            owner_id,
        });
        errors.finish_with(store)
    }
}

/// Search filter for the public store listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreFilter {
    /// Case-insensitive match against name, address or email.
    pub q: Option<String>,
}
