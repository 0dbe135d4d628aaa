//! Registration and login.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{User, UserInput};
use crate::routes::extract::ApiJson;
use crate::services::{AuthService, Registrar};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Handle registration.
///
/// `POST /auth/register`
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UserInput>,
) -> Result<(StatusCode, ApiJson<User>)> {
    let user = AuthService::new(state.pool())
        .register(&input, Registrar::Public)
        .await?;

    Ok((StatusCode::CREATED, ApiJson(user)))
}

/// Handle login; returns a bearer token and the user.
///
/// `POST /auth/login`
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> Result<ApiJson<LoginResponse>> {
    let user = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await?;

    let token = state.tokens().issue(user.id, user.role)?;

    Ok(ApiJson(LoginResponse { token, user }))
}
