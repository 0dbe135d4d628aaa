//! Platform statistics.

use axum::extract::State;

use crate::db::{PlatformStats, StatsRepository};
use crate::error::Result;
use crate::middleware::{AdminOnly, Authorized};
use crate::routes::extract::ApiJson;
use crate::state::AppState;

/// Total users, stores and ratings.
///
/// `GET /stats`
pub async fn totals(
    _admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
) -> Result<ApiJson<PlatformStats>> {
    let stats = StatsRepository::new(state.pool()).totals().await?;
    Ok(ApiJson(stats))
}
