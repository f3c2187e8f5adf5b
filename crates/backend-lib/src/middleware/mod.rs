// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the account HTTP API.

pub mod auth;

pub use auth::{require_auth, AuthenticatedUser};
