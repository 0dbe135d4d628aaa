//! Store listing and creation.

use axum::{extract::State, http::StatusCode};

use crate::error::Result;
use crate::middleware::{AdminOnly, Authorized};
use crate::models::{Store, StoreFilter, StoreInput, StoreSummary};
use crate::routes::extract::{ApiJson, ApiQuery};
use crate::services::StoreService;
use crate::state::AppState;

/// List stores with their average rating.
///
/// `GET /stores?q=`
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StoreFilter>,
) -> Result<ApiJson<Vec<StoreSummary>>> {
    let stores = StoreService::new(state.pool())
        .list(filter.q.as_deref())
        .await?;

    Ok(ApiJson(stores))
}

/// Create a store (Admin only).
///
/// `POST /stores`
#[tracing::instrument(skip_all, fields(admin_id = %admin.user().id))]
pub async fn create(
    admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<StoreInput>,
) -> Result<(StatusCode, ApiJson<Store>)> {
    let store = StoreService::new(state.pool()).create(&input).await?;

    Ok((StatusCode::CREATED, ApiJson(store)))
}
