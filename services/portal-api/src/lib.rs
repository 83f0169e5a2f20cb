//! Portal API Service Library
//!
//! HTTP front of the S-100 maritime product registry: routes
//! `/api/{product}/{wms|wfs|wcs}` to the registered products and exposes
//! registry introspection, health and Prometheus metrics.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // OGC dispatch
        .route("/api/:product/:service", get(handlers::ogc::ogc_handler))
        .route("/api/v1/:product/:service", get(handlers::ogc::ogc_handler))
        // Registry introspection
        .route("/api/services", get(handlers::services::list_services_handler))
        .route(
            "/api/services/statistics",
            get(handlers::services::statistics_handler),
        )
        .route(
            "/api/services/health",
            get(handlers::services::services_health_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
