//! Field-level input validation.
//!
//! Request payloads are checked field by field and every problem is
//! collected, so a client sees all of them in one response.

use serde::{Deserialize, Deserializer, Serialize};

use store_ratings_core::Email;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field as sent by the client.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

/// Every field error found in one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Build an error carrying a single field problem.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Record a problem with `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// All recorded problems, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finish a validation pass.
    ///
    /// # Errors
    ///
    /// Returns `self` if any problem was recorded.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Finish a validation pass that produced `value`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any problem was recorded or `value` is missing.
    pub fn finish_with<T>(mut self, value: Option<T>) -> Result<T, Self> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            Some(_) => Err(self),
            None => {
                if self.is_empty() {
                    self.add("body", "invalid input");
                }
                Err(self)
            }
        }
    }
}

/// Trim `value` and require `1..=max` characters.
///
/// Returns the trimmed text; a problem is recorded when it is out of bounds.
pub fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> String {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        errors.add(field, format!("{field} is required"));
    } else if len > max {
        errors.add(field, format!("{field} must be at most {max} characters"));
    }
    trimmed.to_owned()
}

/// Parse a required email address.
pub fn required_email(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
) -> Option<Email> {
    Email::parse(value)
        .map_err(|e| errors.add(field, format!("valid email is required ({e})")))
        .ok()
}

/// Parse an email address that may be absent or blank.
pub fn optional_email(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
) -> Option<Email> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(raw) => required_email(errors, field, raw),
    }
}

/// Deserialize an optional integer sent as a JSON number or a numeric string.
///
/// A string that is not a number becomes `None`, so validation reports it
/// against its own field. Pair with `#[serde(default)]`.
///
/// # Errors
///
/// Fails on values that are neither numbers nor strings.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        let mut errors = ValidationErrors::default();
        assert_eq!(required_text(&mut errors, "name", "  Corner Shop ", 100), "Corner Shop");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_required_text_bounds() {
        let mut errors = ValidationErrors::default();
        required_text(&mut errors, "name", "   ", 100);
        required_text(&mut errors, "address", &"x".repeat(256), 255);
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "address"]);
        assert!(errors.finish().is_err());
    }

    #[test]
    fn test_optional_email() {
        let mut errors = ValidationErrors::default();
        assert!(optional_email(&mut errors, "email", None).is_none());
        assert!(optional_email(&mut errors, "email", Some(" ")).is_none());
        assert!(errors.is_empty());

        let email = optional_email(&mut errors, "email", Some("Shop@Mail.com"));
        assert_eq!(email.map(Email::into_inner).as_deref(), Some("shop@mail.com"));

        assert!(optional_email(&mut errors, "email", Some("nope")).is_none());
        assert_eq!(errors.errors().len(), 1);
    }

    #[derive(Debug, Deserialize)]
    struct Numeric {
        #[serde(default, deserialize_with = "lenient_int")]
        value: Option<i64>,
    }

    fn numeric(json: &str) -> Option<i64> {
        serde_json::from_str::<Numeric>(json).unwrap().value
    }

    #[test]
    fn test_lenient_int_accepts_numbers_and_numeric_strings() {
        assert_eq!(numeric(r#"{"value":4}"#), Some(4));
        assert_eq!(numeric(r#"{"value":"4"}"#), Some(4));
        assert_eq!(numeric(r#"{"value":" -7 "}"#), Some(-7));
    }

    #[test]
    fn test_lenient_int_leaves_unusable_values_to_validation() {
        assert_eq!(numeric(r#"{"value":"abc"}"#), None);
        assert_eq!(numeric(r#"{"value":""}"#), None);
        assert_eq!(numeric(r#"{"value":null}"#), None);
        assert_eq!(numeric("{}"), None);
        assert!(serde_json::from_str::<Numeric>(r#"{"value":true}"#).is_err());
    }

    #[test]
    fn test_display_lists_fields() {
        let errors = ValidationErrors::single("rating", "rating must be between 1 and 5");
        assert_eq!(
            errors.to_string(),
            "validation failed: rating: rating must be between 1 and 5"
        );
    }
}
