//! API route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use tracing::debug;

use geoproxy_core::types::LookupRequest;

use crate::dto::*;
use crate::error::ApiError;
use crate::routes::{GEOCODE_PATH, SEARCH_PATH};
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// POST /api/address/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<AddressesResponse>> {
    let started = Instant::now();
    state.requests.record_request(SEARCH_PATH);

    let Json(req) = payload?;
    let request = LookupRequest::text(req.query);
    request.validate()?;

    let result = state.lookup.lookup(&request).await?;
    debug!(addresses = result.count(), "Search answered");

    state.requests.observe_duration(SEARCH_PATH, started.elapsed());
    Ok(Json(result.into()))
}

/// POST /api/address/geocode
pub async fn geocode(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<GeocodeRequest>, JsonRejection>,
) -> Result<Json<AddressesResponse>> {
    let started = Instant::now();
    state.requests.record_request(GEOCODE_PATH);

    let Json(req) = payload?;
    let request = LookupRequest::coordinates(req.lat, req.lng);
    request.validate()?;

    let result = state.lookup.lookup(&request).await?;
    debug!(addresses = result.count(), "Geocode answered");

    state.requests.observe_duration(GEOCODE_PATH, started.elapsed());
    Ok(Json(result.into()))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cache_backend: state.config.cache_backend.to_string(),
        cache_connected: state.cache_connected(),
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&state.registry.gather(), &mut buffer)
        .map_err(|e| ApiError::internal(format!("failed to encode metrics: {e}")))?;

    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer))
}
