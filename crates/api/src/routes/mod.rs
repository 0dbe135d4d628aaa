//! HTTP route handlers for the ratings API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Service banner
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (database)
//!
//! # Auth
//! POST /auth/register                 - Register (User or Owner)
//! POST /auth/login                    - Login, returns bearer token
//!
//! # Stores
//! GET  /stores                        - Stores with average rating (?q=)
//! POST /stores                        - Create store (Admin)
//!
//! # Ratings
//! POST /ratings                       - Add or update own rating (auth)
//! GET  /ratings/user                  - Own ratings by store (auth)
//! GET  /ratings/owner/average-rating  - Ratings of own stores (Owner)
//! GET  /ratings/{store_id}            - Average rating of a store
//!
//! # Users
//! GET  /users                         - List users (Admin, ?role=&q=)
//! POST /users                         - Create user (Admin)
//! GET  /users/{id}                    - User detail (Admin)
//! PUT  /users/update-password         - Change own password (auth)
//!
//! # Stats
//! GET  /stats                         - Platform totals (Admin)
//! ```

pub mod auth;
pub mod extract;
pub mod ratings;
pub mod stats;
pub mod stores;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::error::AppError;
use crate::routes::extract::ApiJson;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new().route("/", get(stores::index).post(stores::create))
}

/// Create the rating routes router.
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(ratings::submit))
        .route("/user", get(ratings::mine))
        .route("/owner/average-rating", get(ratings::owner_average))
        .route("/{store_id}", get(ratings::store_average))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/update-password", put(users::update_password))
        .route("/{id}", get(users::show))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/stores", store_routes())
        .nest("/ratings", rating_routes())
        .nest("/users", user_routes())
        .route("/stats", get(stats::totals))
        .fallback(not_found)
}

#[derive(Serialize)]
struct Banner {
    message: &'static str,
}

async fn root() -> ApiJson<Banner> {
    ApiJson(Banner {
        message: "API is running",
    })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match crate::db::ping(state.pool()).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}
