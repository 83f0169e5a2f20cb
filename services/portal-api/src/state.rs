//! Application state for the portal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::{DatasetLookup, InMemoryCatalog, PgCatalog};
use metrics_exporter_prometheus::PrometheusHandle;
use ogc_service::{register_defaults, ServiceRegistry};
use tracing::info;

use crate::config::{load_seed, PortalConfig};

/// Startup settings gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub database_url: Option<String>,
    pub public_url: Option<String>,
    pub seed_file: Option<PathBuf>,
}

/// Shared application state.
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,

    /// Probed by the readiness check.
    pub catalog: Arc<dyn DatasetLookup>,

    /// Base URL for capability self-references; the Host header when unset.
    pub public_url: Option<String>,

    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Connect the catalog, load product configs and register every product.
    pub async fn new(settings: &Settings, prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let config = PortalConfig::load_from_dir(&settings.config_dir)?;

        let catalog: Arc<dyn DatasetLookup> = match &settings.database_url {
            Some(url) => {
                let pg = PgCatalog::connect(url).await.context("Failed to connect dataset catalog")?;
                pg.migrate().await.context("Failed to prepare catalog schema")?;
                info!("Using PostgreSQL dataset catalog");
                Arc::new(pg)
            }
            None => {
                let records = match &settings.seed_file {
                    Some(path) => load_seed(path)?,
                    None => Vec::new(),
                };
                info!(datasets = records.len(), "Using in-memory dataset catalog");
                Arc::new(InMemoryCatalog::with_records(records))
            }
        };

        let state = Self::with_catalog(config, catalog, settings.public_url.clone()).await?;
        Ok(Self { prometheus, ..state })
    }

    /// State over an existing catalog, with every configured product registered.
    pub async fn with_catalog(
        config: PortalConfig,
        catalog: Arc<dyn DatasetLookup>,
        public_url: Option<String>,
    ) -> Result<Self> {
        let registry = Arc::new(ServiceRegistry::new());
        register_defaults(&registry, config.services, Arc::new(config.provider), catalog.clone())
            .await
            .context("Failed to register products")?;

        Ok(Self {
            registry,
            catalog,
            public_url: public_url.map(|u| u.trim_end_matches('/').to_string()),
            prometheus: None,
        })
    }
}
