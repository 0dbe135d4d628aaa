//! Rating domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use store_ratings_core::{AverageRating, RatingId, RatingValue, StoreId, UserId};

use super::validation::{ValidationErrors, lenient_int};

/// One user's opinion of one store.
#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub rating: RatingValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a rating upsert.
#[derive(Debug, Clone)]
pub struct RatingWrite {
    /// The row as it now stands.
    pub rating: Rating,
    /// `true` when no earlier rating existed for the pair.
    pub inserted: bool,
}

/// Rating submission as sent by a client.
///
/// Both fields stay raw integers here so an out-of-range value is reported
/// as a field error instead of a body parse failure. Numeric strings are
/// accepted as well as numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingInput {
    #[serde(alias = "storeId", default, deserialize_with = "lenient_int")]
    pub store_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub rating: Option<i64>,
}

impl RatingInput {
    /// Validate both fields.
    ///
    /// # Errors
    ///
    /// Returns all field problems found.
    pub fn validate(&self) -> Result<(StoreId, RatingValue), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let store_id = self
            .store_id
            .filter(|id| *id > 0)
            .and_then(|id| i32::try_from(id).ok())
            .map(StoreId::new);
        if store_id.is_none() {
            errors.add("store_id", "Invalid store ID");
        }

        let rating = self.rating.and_then(|v| RatingValue::try_from(v).ok());
        if rating.is_none() {
            errors.add(
                "rating",
                format!(
                    "Rating must be between {} and {}",
                    RatingValue::MIN,
                    RatingValue::MAX
                ),
            );
        }

        errors.finish_with(store_id.zip(rating))
    }
}

/// A received rating paired with the name of the user who gave it.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedRating {
    pub rating: RatingValue,
    pub user_name: String,
    pub store_id: StoreId,
    pub store_name: String,
}

/// Everything an owner's stores received.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRatings {
    pub average_rating: AverageRating,
    pub ratings: Vec<ReceivedRating>,
}

impl OwnerRatings {
    /// Aggregate the received ratings.
    #[must_use]
    pub fn from_ratings(ratings: Vec<ReceivedRating>) -> Self {
        let average_rating = AverageRating::from_values(ratings.iter().map(|r| r.rating));
        Self {
            average_rating,
            ratings,
        }
    }
}
