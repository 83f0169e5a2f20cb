//! Registry introspection endpoints.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use ogc_protocol::ServiceConfig;
use ogc_service::{RegistryStatistics, ServiceHealth};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ServiceList {
    pub services: Vec<ServiceConfig>,
}

#[derive(Serialize)]
pub struct RegistryHealth {
    pub healthy: bool,
    pub services: Vec<ServiceHealth>,
}

/// GET /api/services
pub async fn list_services_handler(Extension(state): Extension<Arc<AppState>>) -> Json<ServiceList> {
    Json(ServiceList {
        services: state.registry.get_service_configs().await,
    })
}

/// GET /api/services/statistics
pub async fn statistics_handler(Extension(state): Extension<Arc<AppState>>) -> Json<RegistryStatistics> {
    Json(state.registry.statistics().await)
}

/// GET /api/services/health
pub async fn services_health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<RegistryHealth> {
    let services = state.registry.health().await;
    Json(RegistryHealth {
        healthy: services.iter().all(|s| s.healthy),
        services,
    })
}
