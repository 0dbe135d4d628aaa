//! Rating submission and aggregate views.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use store_ratings_core::{AverageRating, RatingValue, StoreId};

use crate::error::Result;
use crate::middleware::{Authorized, OwnerOnly, RequireAuth};
use crate::models::{OwnerRatings, Rating, RatingInput};
use crate::routes::extract::{ApiJson, ApiPath};
use crate::services::RatingService;
use crate::state::AppState;

/// A store's current average.
#[derive(Debug, Serialize)]
pub struct StoreAverage {
    pub average_rating: AverageRating,
}

/// Result of a rating submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: &'static str,
    pub rating: Rating,
    pub average_rating: AverageRating,
}

/// Average rating of one store.
///
/// `GET /ratings/{store_id}`
pub async fn store_average(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<StoreId>,
) -> Result<ApiJson<StoreAverage>> {
    let average_rating = RatingService::new(state.pool())
        .store_average(store_id)
        .await?;

    Ok(ApiJson(StoreAverage { average_rating }))
}

/// Add or replace the caller's rating of a store.
///
/// `POST /ratings`
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RatingInput>,
) -> Result<(StatusCode, ApiJson<SubmitResponse>)> {
    let submission = RatingService::new(state.pool())
        .submit(user.id, &input)
        .await?;

    let message = if submission.write.inserted {
        "Rating added"
    } else {
        "Rating updated"
    };

    Ok((
        StatusCode::CREATED,
        ApiJson(SubmitResponse {
            message,
            rating: submission.write.rating,
            average_rating: submission.average_rating,
        }),
    ))
}

/// The caller's ratings as a `{store_id: rating}` map.
///
/// `GET /ratings/user`
pub async fn mine(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Response> {
    let ratings: BTreeMap<StoreId, RatingValue> =
        RatingService::new(state.pool()).for_user(user.id).await?;

    let mut response = ApiJson(ratings).into_response();
    response.headers_mut().insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    Ok(response)
}

/// Ratings received by the calling owner's stores.
///
/// `GET /ratings/owner/average-rating`
pub async fn owner_average(
    owner: Authorized<OwnerOnly>,
    State(state): State<AppState>,
) -> Result<ApiJson<OwnerRatings>> {
    let view = RatingService::new(state.pool())
        .owner_view(owner.user().id)
        .await?;

    Ok(ApiJson(view))
}
