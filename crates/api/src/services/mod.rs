//! Business logic services for the ratings API.
//!
//! # Services
//!
//! - `auth` - Registration (identity reservation), login, password changes
//! - `token` - Access token issuance and verification
//! - `ratings` - Rating upsert and aggregation
//! - `stores` - Store creation and listing
//! - `users` - Admin user directory
//!
//! Services borrow the pool from `AppState` for one operation; they hold no
//! state of their own.

pub mod auth;
pub mod ratings;
pub mod stores;
pub mod token;
pub mod users;

pub use auth::{AuthError, AuthService, Registrar};
pub use ratings::{RatingService, RatingServiceError, RatingSubmission};
pub use stores::{StoreService, StoreServiceError};
pub use token::{Claims, TokenError, TokenService};
pub use users::{UserService, UserServiceError};
