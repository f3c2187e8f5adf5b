// ============================
// crates/backend-lib/src/routes.rs
// ============================
//! HTTP router.
use crate::handlers::users;
use crate::middleware::require_auth;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Base path of the account API
pub const USERS_PATH: &str = "/api/v1/users";

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route(
            "/profile",
            get(users::get_profile).patch(users::update_profile),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let accounts = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .merge(protected);

    Router::new()
        .route("/health", get(users::health))
        .nest(USERS_PATH, accounts)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
