//! Store Ratings Core - Shared types library.
//!
//! This crate provides the domain types used across all store ratings components:
//! - `api` - HTTP service for users, stores and ratings
//! - `cli` - Command-line tools for migrations, user bootstrap and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles and ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
