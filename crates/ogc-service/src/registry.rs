//! Process-wide table of registered products.
//!
//! Constructed once at startup and shared through an `Arc`; readers take a
//! shared lock, register/unregister take the write lock, so products can be
//! replaced at runtime without a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ogc_common::{OgcError, ServiceType};
use ogc_protocol::{ConfigError, ServiceConfig};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::handlers::OgcRequest;
use crate::product::ProductService;
use crate::response::ServiceResponse;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid configuration for {code}: {source}")]
    InvalidConfig {
        code: String,
        #[source]
        source: ConfigError,
    },
}

/// Snapshot computed on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatistics {
    pub total_services: usize,
    pub services: Vec<ServiceSummary>,
    /// Keyed by `WMS` / `WFS` / `WCS`; only types offered by some product appear.
    pub capabilities_by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub code: String,
    pub name: String,
    pub capabilities: Vec<ServiceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub code: String,
    pub healthy: bool,
    pub capability_count: usize,
    pub checked_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<String, Arc<dyn ProductService>>>,
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `service` under its product code, returning any replaced entry.
    #[instrument(skip_all, fields(code = %service.config().service_code))]
    pub async fn register(
        &self,
        service: Arc<dyn ProductService>,
    ) -> Result<Option<Arc<dyn ProductService>>, RegistryError> {
        let config = service.config();
        config.validate().map_err(|source| RegistryError::InvalidConfig {
            code: config.service_code.clone(),
            source,
        })?;
        let code = normalize(&config.service_code);
        let capabilities: Vec<ServiceType> =
            service.capabilities().iter().map(|c| c.service_type).collect();

        let previous = self.services.write().await.insert(code.clone(), service);
        info!(
            code = %code,
            capabilities = ?capabilities,
            replaced = previous.is_some(),
            "Registered service"
        );
        Ok(previous)
    }

    /// Remove `code`; returns whether anything was registered.
    pub async fn unregister(&self, code: &str) -> bool {
        let removed = self.services.write().await.remove(&normalize(code)).is_some();
        if removed {
            info!(code = %normalize(code), "Unregistered service");
        }
        removed
    }

    pub async fn get_service(&self, code: &str) -> Option<Arc<dyn ProductService>> {
        self.services.read().await.get(&normalize(code)).cloned()
    }

    pub async fn has_service(&self, code: &str) -> bool {
        self.services.read().await.contains_key(&normalize(code))
    }

    /// Sorted product codes.
    pub async fn service_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.services.read().await.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Every product exposing a capability of `service_type`, sorted by code.
    pub async fn get_services_by_capability(&self, service_type: ServiceType) -> Vec<Arc<dyn ProductService>> {
        let services = self.services.read().await;
        let mut matched: Vec<(&String, &Arc<dyn ProductService>)> = services
            .iter()
            .filter(|(_, s)| s.capabilities().iter().any(|c| c.service_type == service_type))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(b.0));
        matched.into_iter().map(|(_, s)| Arc::clone(s)).collect()
    }

    /// Configurations of all products, sorted by code.
    pub async fn get_service_configs(&self) -> Vec<ServiceConfig> {
        let services = self.services.read().await;
        let mut configs: Vec<ServiceConfig> = services.values().map(|s| s.config().clone()).collect();
        configs.sort_by(|a, b| a.service_code.cmp(&b.service_code));
        configs
    }

    pub async fn statistics(&self) -> RegistryStatistics {
        let services = self.services.read().await;
        let mut summaries: Vec<ServiceSummary> = Vec::with_capacity(services.len());
        let mut capabilities_by_type: BTreeMap<String, usize> = BTreeMap::new();

        for (code, service) in services.iter() {
            let capabilities: Vec<ServiceType> =
                service.capabilities().iter().map(|c| c.service_type).collect();
            for service_type in &capabilities {
                *capabilities_by_type.entry(service_type.to_string()).or_default() += 1;
            }
            summaries.push(ServiceSummary {
                code: code.clone(),
                name: service.config().service_name.clone(),
                capabilities,
            });
        }
        summaries.sort_by(|a, b| a.code.cmp(&b.code));

        RegistryStatistics {
            total_services: summaries.len(),
            services: summaries,
            capabilities_by_type,
        }
    }

    /// Healthy when at least one capability is declared and each is handled.
    pub async fn health(&self) -> Vec<ServiceHealth> {
        let checked_at = Utc::now();
        let services = self.services.read().await;
        let mut report: Vec<ServiceHealth> = services
            .iter()
            .map(|(code, service)| {
                let capabilities = service.capabilities();
                ServiceHealth {
                    code: code.clone(),
                    healthy: !capabilities.is_empty()
                        && capabilities.iter().all(|c| service.handles(c.service_type)),
                    capability_count: capabilities.len(),
                    checked_at,
                }
            })
            .collect();
        report.sort_by(|a, b| a.code.cmp(&b.code));
        report
    }

    /// Route a request to product `code`; unknown products get a 404 envelope.
    pub async fn dispatch(&self, code: &str, service_type: ServiceType, request: &OgcRequest) -> ServiceResponse {
        match self.get_service(code).await {
            Some(service) => service.handle_request(request, service_type).await,
            None => ServiceResponse::from_error(&OgcError::ServiceNotFound(normalize(code))),
        }
    }
}
