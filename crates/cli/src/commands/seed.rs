//! Seed the database with demo users, stores and ratings.
//!
//! The seed file is YAML. Stores name their owner by email and ratings name
//! their author by email and their store by name:
//!
//! ```yaml
//! users:
//!   - name: Olivia Owner
//!     email: olivia@example.com
//!     password: owner-pass
//!     address: 12 Market Street
//!     role: owner
//! stores:
//!   - name: Corner Grocery
//!     address: 1 Main Street
//!     owner: olivia@example.com
//! ratings:
//!   - user: olivia@example.com
//!     store: Corner Grocery
//!     rating: 4
//! ```
//!
//! Everything goes through the same services as the HTTP API. Users and
//! stores that already exist are reused, and ratings are upserts, so the
//! command can be run repeatedly.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use store_ratings_api::db::{StoreRepository, UserRepository};
use store_ratings_api::models::{RatingInput, StoreInput, UserInput};
use store_ratings_api::services::{AuthService, RatingService, Registrar, StoreService};
use store_ratings_core::{Email, StoreId, UserId};

use super::{CommandError, connect};

/// Top-level seed document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub stores: Vec<SeedStore>,
    #[serde(default)]
    pub ratings: Vec<SeedRating>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedStore {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    /// Owner's email.
    pub owner: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedRating {
    /// Author's email.
    pub user: String,
    /// Store name.
    pub store: String,
    pub rating: i64,
}

/// Counts of what a seed run touched.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub users_created: usize,
    pub users_existing: usize,
    pub stores_created: usize,
    pub stores_existing: usize,
    pub ratings_written: usize,
}

impl SeedFile {
    /// Parse a seed document.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::SeedFormat` if the YAML does not match.
    pub fn parse(content: &str) -> Result<Self, CommandError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Load a seed file and apply it.
pub async fn run(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed data");

    // Parse before connecting so a bad file fails fast
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::SeedFile {
            path: file_path.to_owned(),
            source,
        })?;
    let seed = SeedFile::parse(&content)?;

    info!(
        users = seed.users.len(),
        stores = seed.stores.len(),
        ratings = seed.ratings.len(),
        "Parsed seed file"
    );

    let pool = connect().await?;
    let summary = apply(&pool, &seed).await?;

    info!("Seeding complete!");
    info!(
        "  Users: {} created, {} already present",
        summary.users_created, summary.users_existing
    );
    info!(
        "  Stores: {} created, {} already present",
        summary.stores_created, summary.stores_existing
    );
    info!("  Ratings written: {}", summary.ratings_written);

    Ok(())
}

/// Apply a parsed seed document.
///
/// # Errors
///
/// Returns the first refusal from a service, or
/// `CommandError::UnknownReference` for a dangling owner, author or store.
pub async fn apply(pool: &PgPool, seed: &SeedFile) -> Result<SeedSummary, CommandError> {
    let mut summary = SeedSummary::default();
    let mut users: HashMap<String, UserId> = HashMap::new();
    let mut stores: HashMap<String, StoreId> = HashMap::new();

    let auth = AuthService::new(pool);
    let user_repo = UserRepository::new(pool);

    for user in &seed.users {
        // A malformed email is left for registration to reject
        let existing = match Email::parse(&user.email) {
            Ok(email) => user_repo.get_by_email(&email).await?,
            Err(_) => None,
        };
        if let Some(existing) = existing {
            summary.users_existing += 1;
            users.insert(existing.email.to_string(), existing.id);
            continue;
        }

        let input = UserInput {
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            address: user.address.clone(),
            role: user.role.clone(),
        };
        let created = auth.register(&input, Registrar::Admin).await?;
        summary.users_created += 1;
        users.insert(created.email.to_string(), created.id);
    }

    let store_service = StoreService::new(pool);
    let store_repo = StoreRepository::new(pool);

    for store in &seed.stores {
        let owner_id = lookup_user(&users, &store.owner)?;

        let existing = store_repo
            .list_with_ratings(Some(store.name.as_str()))
            .await?
            .into_iter()
            .find(|s| s.store.name == store.name.trim());
        if let Some(existing) = existing {
            summary.stores_existing += 1;
            stores.insert(existing.store.name, existing.store.id);
            continue;
        }

        let input = StoreInput {
            name: store.name.clone(),
            email: store.email.clone(),
            address: store.address.clone(),
            owner_id: Some(i64::from(owner_id.as_i32())),
        };
        let created = store_service.create(&input).await?;
        summary.stores_created += 1;
        stores.insert(created.name, created.id);
    }

    let ratings = RatingService::new(pool);

    for rating in &seed.ratings {
        let user_id = lookup_user(&users, &rating.user)?;
        let store_id = stores
            .get(rating.store.trim())
            .copied()
            .ok_or_else(|| CommandError::UnknownReference {
                kind: "store",
                name: rating.store.clone(),
            })?;

        let input = RatingInput {
            store_id: Some(i64::from(store_id.as_i32())),
            rating: Some(rating.rating),
        };
        ratings.submit(user_id, &input).await?;
        summary.ratings_written += 1;
    }

    Ok(summary)
}

fn lookup_user(users: &HashMap<String, UserId>, email: &str) -> Result<UserId, CommandError> {
    users
        .get(&email.trim().to_lowercase())
        .copied()
        .ok_or_else(|| CommandError::UnknownReference {
            kind: "user",
            name: email.to_owned(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_parses_and_is_consistent() {
        let seed = SeedFile::parse(include_str!("../../seed/demo.yaml")).unwrap();

        assert!(!seed.users.is_empty());
        assert!(!seed.stores.is_empty());

        let emails: Vec<String> = seed.users.iter().map(|u| u.email.to_lowercase()).collect();
        for store in &seed.stores {
            assert!(emails.contains(&store.owner.to_lowercase()), "{}", store.owner);
        }
        for rating in &seed.ratings {
            assert!(emails.contains(&rating.user.to_lowercase()), "{}", rating.user);
            assert!(seed.stores.iter().any(|s| s.name == rating.store));
            assert!((1..=5).contains(&rating.rating));
        }
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = SeedFile::parse("users: []\nproducts: []\n").unwrap_err();
        assert!(matches!(err, CommandError::SeedFormat(_)));
    }

    #[test]
    fn test_sections_default_to_empty() {
        let seed = SeedFile::parse("users: []\n").unwrap();
        assert!(seed.stores.is_empty());
        assert!(seed.ratings.is_empty());
    }

    #[test]
    fn test_lookup_user_ignores_case() {
        let mut users = HashMap::new();
        users.insert("olivia@example.com".to_owned(), UserId::new(3));

        assert_eq!(
            lookup_user(&users, " Olivia@Example.com").unwrap(),
            UserId::new(3)
        );
        assert!(matches!(
            lookup_user(&users, "nobody@example.com"),
            Err(CommandError::UnknownReference { kind: "user", .. })
        ));
    }
}
