//! Star rating values and their aggregate.

use serde::{Deserialize, Serialize, Serializer};

/// Errors that can occur when building a [`RatingValue`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value lies outside `1..=5`.
    #[error("rating must be between {min} and {max} (got {got})")]
    OutOfRange {
        /// Smallest accepted value.
        min: i32,
        /// Largest accepted value.
        max: i32,
        /// The rejected value.
        got: i64,
    },
}

/// A single star rating, always within `1..=5`.
///
/// ```
/// use store_ratings_core::RatingValue;
///
/// assert_eq!(RatingValue::try_from(4).unwrap().get(), 4);
/// assert!(RatingValue::try_from(0).is_err());
/// assert!(RatingValue::try_from(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct RatingValue(i32);

impl RatingValue {
    /// Lowest star count.
    pub const MIN: i32 = 1;
    /// Highest star count.
    pub const MAX: i32 = 5;

    /// Get the star count.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        i32::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                got: value,
            })
    }
}

impl TryFrom<i32> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<RatingValue> for i32 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

impl std::fmt::Display for RatingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RatingValue {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RatingValue {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RatingValue {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Arithmetic mean of a set of ratings.
///
/// An empty set averages to `0.0`. The exact mean is kept internally and
/// serialized rounded to one decimal place.
///
/// ```
/// use store_ratings_core::{AverageRating, RatingValue};
///
/// let values = [3, 4, 5].map(|v| RatingValue::try_from(v).unwrap());
/// assert_eq!(AverageRating::from_values(values).rounded(), 4.0);
/// assert_eq!(AverageRating::from_values([]).rounded(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct AverageRating(f64);

impl AverageRating {
    /// The average of a store nobody has rated yet.
    pub const NONE: Self = Self(0.0);

    /// Fold a set of ratings into their mean.
    pub fn from_values(values: impl IntoIterator<Item = RatingValue>) -> Self {
        let (sum, count) = values
            .into_iter()
            .fold((0_i64, 0_u32), |(sum, count), value| {
                (sum + i64::from(value.get()), count + 1)
            });

        if count == 0 {
            return Self::NONE;
        }

        // Sums of 1..=5 stay far below 2^52
        #[allow(clippy::cast_precision_loss)]
        let mean = sum as f64 / f64::from(count);
        Self(mean)
    }

    /// Wrap a mean computed by the database (`AVG` yields `NULL` for no rows).
    #[must_use]
    pub fn from_mean(mean: Option<f64>) -> Self {
        mean.filter(|m| m.is_finite()).map_or(Self::NONE, Self)
    }

    /// The exact mean.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The mean rounded to one decimal place.
    #[must_use]
    pub fn rounded(self) -> f64 {
        (self.0 * 10.0).round() / 10.0
    }
}

impl Serialize for AverageRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.rounded())
    }
}

impl std::fmt::Display for AverageRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.rounded())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn values(raw: &[i32]) -> Vec<RatingValue> {
        raw.iter()
            .map(|v| RatingValue::try_from(*v).unwrap())
            .collect()
    }

    #[test]
    fn test_rating_bounds() {
        for v in 1..=5 {
            assert!(RatingValue::try_from(v).is_ok());
        }
        assert_eq!(
            RatingValue::try_from(0),
            Err(RatingError::OutOfRange {
                min: 1,
                max: 5,
                got: 0
            })
        );
        assert!(RatingValue::try_from(6).is_err());
        assert!(RatingValue::try_from(-1_i64).is_err());
        assert!(RatingValue::try_from(i64::MAX).is_err());
    }

    #[test]
    fn test_rating_deserialize_checks_range() {
        let value: RatingValue = serde_json::from_str("3").unwrap();
        assert_eq!(value.get(), 3);
        assert!(serde_json::from_str::<RatingValue>("6").is_err());
        assert_eq!(serde_json::to_string(&value).unwrap(), "3");
    }

    #[test]
    fn test_average_of_three_four_five() {
        let avg = AverageRating::from_values(values(&[3, 4, 5]));
        assert!((avg.value() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_of_empty_is_zero() {
        assert_eq!(AverageRating::from_values([]), AverageRating::NONE);
        assert_eq!(AverageRating::from_mean(None).rounded(), 0.0);
    }

    #[test]
    fn test_rounding_to_one_decimal() {
        let avg = AverageRating::from_values(values(&[4, 4, 5]));
        assert!((avg.value() - 13.0 / 3.0).abs() < 1e-9);
        assert!((avg.rounded() - 4.3).abs() < f64::EPSILON);
        assert_eq!(avg.to_string(), "4.3");
        assert_eq!(serde_json::to_string(&avg).unwrap(), "4.3");
    }

    #[test]
    fn test_from_mean_ignores_non_finite() {
        assert_eq!(AverageRating::from_mean(Some(f64::NAN)), AverageRating::NONE);
        assert!((AverageRating::from_mean(Some(2.5)).value() - 2.5).abs() < f64::EPSILON);
    }
}
