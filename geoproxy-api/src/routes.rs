//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Forward geocoding endpoint, also its `endpoint` metric label.
pub const SEARCH_PATH: &str = "/api/address/search";

/// Reverse geocoding endpoint, also its `endpoint` metric label.
pub const GEOCODE_PATH: &str = "/api/address/geocode";

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))

        // Address lookups
        .route(SEARCH_PATH, post(handlers::search))
        .route(GEOCODE_PATH, post(handlers::geocode))

        .with_state(state)
}
