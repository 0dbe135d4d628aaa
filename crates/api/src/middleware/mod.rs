//! HTTP middleware stack for the ratings API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (local client plus `FRONTEND_URL`)
//! 5. Security headers
//!
//! Authentication is not a layer: routes opt in through the `RequireAuth`
//! and `Authorized<R>` extractors.

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::{AdminOnly, Authorized, CurrentUser, OwnerOnly, RequireAuth, RoleSet, authorize};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
