//! HTTP API routes and handlers.
//!
//! This module contains all HTTP endpoint implementations organized by domain:
//! - `sessions` - Vehicle check-in, check-out, lookup and listing
//! - `health` - Service health checks
//! - `welcome` - Localized landing text
//! - `locale` - Per-request language selection
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::SharedState;

pub mod error;
pub mod health;
pub mod locale;
pub mod openapi;
pub mod sessions;
pub mod welcome;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use openapi::get_openapi_json;

/// Creates the combined API router with all endpoints.
///
/// # Route Structure
///
/// ```text
/// /health                          - Health check
/// /swagger-ui                      - Swagger UI
/// /api
/// ├── /welcome                     - Localized welcome text
/// ├── /openapi.json                - OpenAPI specification
/// └── /sessions                    - List (GET) and check in (POST)
///     └── /open/{plate}            - Find open session (GET)
///         └── /exit                - Check out (PUT)
/// ```
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest(
            "/api",
            Router::new()
                .route("/welcome", get(welcome::welcome))
                .nest("/sessions", sessions::router()),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
