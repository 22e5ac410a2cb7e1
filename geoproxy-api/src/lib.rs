//! # GeoProxy API Server
//!
//! HTTP front end for the cache-aside geocoding proxy.
//!
//! ## Endpoints
//!
//! - `POST /api/address/search` - Forward geocoding, body `{"query": "..."}`
//! - `POST /api/address/geocode` - Reverse geocoding, body `{"lat": "...", "lng": "..."}`
//! - `GET /health` - Liveness, version and cache backend state
//! - `GET /metrics` - Prometheus text exposition
//!
//! Both lookup endpoints answer `200 {"addresses": [...]}`, `404` when the
//! provider found nothing, `400` for a bad body and `500` otherwise.
//!
//! ## Example
//!
//! ```rust,ignore
//! use geoproxy_api::{ApiServer, AppConfig};
//!
//! let server = ApiServer::build(AppConfig::from_env()?).await?;
//! server.run(([0, 0, 0, 0], 8080)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod metrics;
mod routes;
mod state;

pub use dto::{AddressesResponse, GeocodeRequest, HealthResponse, SearchRequest};
pub use error::ApiError;
pub use metrics::{RequestMetrics, REQUESTS_TOTAL_METRIC, REQUEST_DURATION_METRIC};
pub use routes::{create_router, GEOCODE_PATH, SEARCH_PATH};
pub use state::{AppConfig, AppState, CacheBackend};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use geoproxy_core::error::Result;

/// API server for the geocoding proxy.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Builds the lookup pipeline from `config` and wraps it in a server.
    pub async fn build(config: AppConfig) -> Result<Self> {
        Ok(Self::from_state(AppState::build(config).await?))
    }

    /// Creates a server around prebuilt state.
    pub fn from_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address until Ctrl-C or SIGTERM.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("GeoProxy API server listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("GeoProxy API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
