//! # Biosearch HTTP API Module
//!
//! This module implements the HTTP proxy in front of the search backend using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /?q=` - Keyword search over project ids and labels
//! - `POST /bioproject` - Forward a query body to the project index
//! - `GET /bioproject/{id}` - Fetch one project document
//! - `GET /metadata?ids=&format=json|tsv` - Flat project metadata
//! - `GET /plotly_data?id=&view=` - Composition bar series
//!
//! ## Error Mapping
//!
//! - Missing or malformed parameters: 400
//! - Backend `NotFound`: 404
//! - Shaping errors (malformed documents, misaligned categories): 422
//! - Backend `BackendUnavailable`: 502, `Timeout`: 504

mod handlers;
mod middleware;
mod types;

pub use handlers::{
    document_handler, health_handler, metadata_handler, plot_data_handler,
    project_search_handler, search_handler,
};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    ErrorResponse, ExportFormat, HealthResponse, MetadataParams, PlotParams, RawSearchResponse,
    SearchParams, SearchResponse,
};

use crate::backend::{BackendError, SearchBackend};
use crate::config::ProxyConfig;
use crate::error::AppError;
use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use biosearch_core::ShapingError;
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the backend client and the resolved configuration.
pub struct AppState<B> {
    pub backend: Arc<B>,
    pub config: Arc<ProxyConfig>,
}

impl<B> AppState<B> {
    #[must_use]
    pub fn new(backend: B, config: ProxyConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config: Arc::new(config),
        }
    }
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
        }
    }
}

// =============================================================================
// ERROR RESPONSES
// =============================================================================

/// Handler failures, rendered as `ErrorResponse` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Shaping(#[from] ShapingError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Backend(BackendError::InvalidRequest(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) | Self::Backend(BackendError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Backend(BackendError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Backend(
                BackendError::BackendUnavailable(_) | BackendError::InvalidResponse(_),
            ) => StatusCode::BAD_GATEWAY,
            Self::Shaping(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `ProxyConfig::cors_origins`.
///
/// - "*": allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins.map(str::trim) {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (cors_origins = \"*\")");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                restricted_cors(allowed_origins)
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting - bounds backend load (if enabled)
pub fn create_router<B: SearchBackend>(state: AppState<B>) -> Router {
    let rate_limit = state.config.rate_limit;
    let cors = build_cors_layer(state.config.cors_origins.as_deref());

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/", get(search_handler::<B>))
        .route("/bioproject", post(project_search_handler::<B>))
        .route("/bioproject/{id}", get(document_handler::<B>))
        .route("/metadata", get(metadata_handler::<B>))
        .route("/plotly_data", get(plot_data_handler::<B>));

    if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server<B: SearchBackend>(
    backend: B,
    config: ProxyConfig,
) -> Result<(), AppError> {
    let addr = config.bind_addr();
    let router = create_router(AppState::new(backend, config));

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!("Biosearch proxy listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Biosearch proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ApiError::Backend(BackendError::NotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Backend(BackendError::Timeout),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ApiError::Backend(BackendError::BackendUnavailable("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Shaping(ShapingError::MalformedInput("x".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{error}");
        }
    }
}
