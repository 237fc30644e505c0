//! Top-level router.
//!
//! # Route Structure
//!
//! - `GET /track/click/{code}` - Click redirect (public)
//! - `GET /track/pixel/{code}` - Tracking pixel (public)
//! - `GET /health`             - Database and click queue health (public)
//! - `/api/*`                  - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, proxy-aware when configured
//! - **Authentication** - Bearer token resolved to an actor (API only)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{click_handler, health_handler, pixel_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the application router.
///
/// Rate limiting keys on the forwarded client IP only when
/// `state.behind_proxy` is set.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let behind_proxy = state.behind_proxy;

    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::api_layer(behind_proxy));

    let tracking_router = Router::new()
        .route("/click/{code}", get(click_handler))
        .route("/pixel/{code}", get(pixel_handler))
        .layer(rate_limit::tracking_layer(behind_proxy));

    let router = Router::new()
        .nest("/track", tracking_router)
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
