//! User management (Admin) and password changes (any account).

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use store_ratings_core::UserId;

use crate::error::Result;
use crate::middleware::{AdminOnly, Authorized, RequireAuth};
use crate::models::{User, UserDetail, UserFilter, UserInput};
use crate::routes::extract::{ApiJson, ApiPath, ApiQuery};
use crate::services::{AuthService, Registrar, UserService};
use crate::state::AppState;

/// Password change form.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(default, alias = "old_password", alias = "currentPassword")]
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(default, alias = "new_password")]
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// List users, filtered by `role` and searched by `q`.
///
/// `GET /users?role=&q=`
pub async fn index(
    _admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> Result<ApiJson<Vec<User>>> {
    let users = UserService::new(state.pool()).list(&filter).await?;
    Ok(ApiJson(users))
}

/// One user; Owners include their average rating.
///
/// `GET /users/{id}`
pub async fn show(
    _admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<ApiJson<UserDetail>> {
    let user = UserService::new(state.pool()).detail(id).await?;
    Ok(ApiJson(user))
}

/// Create a user of any role.
///
/// `POST /users`
#[tracing::instrument(skip_all, fields(admin_id = %admin.user().id))]
pub async fn create(
    admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UserInput>,
) -> Result<(StatusCode, ApiJson<User>)> {
    let user = AuthService::new(state.pool())
        .register(&input, Registrar::Admin)
        .await?;

    Ok((StatusCode::CREATED, ApiJson(user)))
}

/// Change the caller's password.
///
/// `PUT /users/update-password`
pub async fn update_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(form): ApiJson<UpdatePasswordRequest>,
) -> Result<ApiJson<MessageResponse>> {
    AuthService::new(state.pool())
        .update_password(user.id, &form.old_password, &form.new_password)
        .await?;

    Ok(ApiJson(MessageResponse {
        message: "Password updated successfully",
    }))
}
