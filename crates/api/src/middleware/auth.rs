//! Authentication and role extractors.
//!
//! Callers authenticate with `Authorization: Bearer <token>`. A missing or
//! non-bearer header is `401`; a token that fails verification, or a role
//! outside the route's allowed set, is `403`. Both rejections happen before
//! the handler body runs.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use store_ratings_core::{Role, UserId};

use crate::error::{AppError, set_sentry_user};
use crate::services::Claims;
use crate::state::AppState;

/// The verified identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl TryFrom<&Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            role: claims.role,
        })
    }
}

/// Extractor that requires a valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Access denied".to_string()))?;

        let claims = state.tokens().verify(token)?;
        let user = CurrentUser::try_from(&claims)?;
        set_sentry_user(&user.id, user.role.as_str());

        Ok(Self(user))
    }
}

/// Pull the token out of an `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// A set of roles a route accepts.
pub trait RoleSet: Send + Sync + 'static {
    /// Roles allowed through.
    const ALLOWED: &'static [Role];
}

/// Only administrators.
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl RoleSet for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

/// Only store owners.
#[derive(Debug, Clone, Copy)]
pub struct OwnerOnly;

impl RoleSet for OwnerOnly {
    const ALLOWED: &'static [Role] = &[Role::Owner];
}

/// Check a verified identity against an allowed role set.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the role is not in `allowed`.
pub fn authorize(user: &CurrentUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = %user.role, "Role not permitted");
        Err(AppError::Forbidden("Access denied".to_string()))
    }
}

/// Extractor that requires a valid token whose role is in `R`.
///
/// # Example
///
/// ```rust,ignore
/// async fn stats(Authorized(admin, ..): Authorized<AdminOnly>) -> impl IntoResponse {
///     format!("Hello admin {}!", admin.id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Authorized<R: RoleSet>(pub CurrentUser, PhantomData<R>);

impl<R: RoleSet> Authorized<R> {
    /// The verified caller.
    #[must_use]
    pub const fn user(&self) -> CurrentUser {
        self.0
    }
}

impl<R: RoleSet> FromRequestParts<AppState> for Authorized<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        authorize(&user, R::ALLOWED)?;
        Ok(Self(user, PhantomData))
    }
}
