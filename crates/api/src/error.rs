//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body is JSON: `{"message": "..."}`, plus `"errors"` listing the
//! rejected fields for validation failures.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{FieldError, ValidationErrors};
use crate::services::{
    AuthError, RatingServiceError, StoreServiceError, TokenError, UserServiceError,
};

/// Application-level error type for the ratings API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input, detected before any mutation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No credential was presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The credential is invalid or its role is not allowed here.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::Validation(_)
                | AuthError::InvalidCredentials
                | AuthError::IncorrectPassword
                | AuthError::UserAlreadyExists
                | AuthError::UserNotFound => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(errors) => first_message(errors),
            Self::Auth(err) => match err {
                AuthError::Validation(errors) => first_message(errors),
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::IncorrectPassword => "Current password is incorrect".to_string(),
                AuthError::UserAlreadyExists => "Email already exists".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_string()
                }
            },
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::Forbidden(msg) => msg.clone(),
        }
    }

    fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) | Self::Auth(AuthError::Validation(errors)) => {
                errors.errors()
            }
            _ => &[],
        }
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .errors()
        .first()
        .map_or_else(|| "Invalid input".to_string(), |e| e.message.clone())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let body = ErrorBody {
            message: self.client_message(),
            errors: self.field_errors().to_vec(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RatingServiceError> for AppError {
    fn from(err: RatingServiceError) -> Self {
        match err {
            RatingServiceError::Validation(errors) => Self::Validation(errors),
            RatingServiceError::StoreNotFound => Self::NotFound("Store".to_string()),
            RatingServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<StoreServiceError> for AppError {
    fn from(err: StoreServiceError) -> Self {
        match err {
            StoreServiceError::Validation(errors) => Self::Validation(errors),
            StoreServiceError::OwnerNotFound => Self::NotFound("Owner".to_string()),
            StoreServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Validation(errors) => Self::Validation(errors),
            UserServiceError::NotFound => Self::NotFound("User".to_string()),
            UserServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encode(e) => Self::Internal(format!("token signing failed: {e}")),
            TokenError::Invalid(_) | TokenError::InvalidSubject => {
                Self::Forbidden("Invalid token".to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::single("body", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(ValidationErrors::single("path", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(ValidationErrors::single("query", rejection.body_text()))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called once a bearer token verifies, so errors are associated with the caller.
pub fn set_sentry_user(user_id: &impl ToString, role: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
        scope.set_tag("role", role);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Store".to_string());
        assert_eq!(err.to_string(), "Not found: Store");

        let err = AppError::Forbidden("Access denied".to_string());
        assert_eq!(err.to_string(), "Forbidden: Access denied");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ValidationErrors::single("rating", "bad").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::IncorrectPassword.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(RatingServiceError::StoreNotFound.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "name is required");
        errors.add("rating", "Rating must be between 1 and 5");
        let (status, json) = body_json(errors.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "name is required");
        assert_eq!(json["errors"][1]["field"], "rating");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, json) =
            body_json(AppError::Internal("connection refused at 10.0.0.3".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal server error");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_message() {
        let (_, json) = body_json(AuthError::UserAlreadyExists.into()).await;
        assert_eq!(json["message"], "Email already exists");
    }
}
