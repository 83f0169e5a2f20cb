//! Portal configuration loading.
//!
//! Layout of the configuration directory:
//!
//! ```text
//! config/
//!   provider.yaml        ServiceProvider block of every capabilities document
//!   services/*.yaml      one ServiceConfig per file, replacing the built-in
//!                        declaration with the same service code
//! ```
//!
//! Every file is optional; a missing directory yields the built-in products.

use std::path::Path;

use anyhow::{Context, Result};
use catalog::DatasetRecord;
use ogc_protocol::{ProviderInfo, ServiceConfig};
use ogc_service::default_configs;
use serde::Deserialize;

/// Product declarations and provider details the portal starts with.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub services: Vec<ServiceConfig>,
    pub provider: ProviderInfo,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            services: default_configs(),
            provider: ProviderInfo::default(),
        }
    }
}

impl PortalConfig {
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "Config directory does not exist, using built-in products");
            return Ok(Self::default());
        }

        let provider_path = dir.join("provider.yaml");
        let provider = if provider_path.exists() {
            read_yaml(&provider_path)?
        } else {
            ProviderInfo::default()
        };

        let overrides = load_service_dir(&dir.join("services"))?;
        let services = merge_overrides(default_configs(), overrides);

        Ok(Self { services, provider })
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read: {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse: {:?}", path))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Service configs from every YAML file in `dir`, sorted by file name.
fn load_service_dir(dir: &Path) -> Result<Vec<ServiceConfig>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))? {
        let path = entry?.path();
        if is_yaml(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut configs = Vec::with_capacity(paths.len());
    for path in paths {
        let config: ServiceConfig = read_yaml(&path)?;
        tracing::info!(code = %config.service_code, file = ?path, "Loaded service config");
        configs.push(config);
    }
    Ok(configs)
}

/// Replace defaults by service code (case-insensitive); unknown codes are appended.
pub fn merge_overrides(defaults: Vec<ServiceConfig>, overrides: Vec<ServiceConfig>) -> Vec<ServiceConfig> {
    let mut merged = defaults;
    for config in overrides {
        match merged
            .iter_mut()
            .find(|c| c.service_code.eq_ignore_ascii_case(&config.service_code))
        {
            Some(existing) => *existing = config,
            None => merged.push(config),
        }
    }
    merged
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    datasets: Vec<DatasetRecord>,
}

/// Dataset records for the in-memory catalog.
pub fn load_seed(path: &Path) -> Result<Vec<DatasetRecord>> {
    let seed: SeedFile = read_yaml(path)?;
    tracing::info!(datasets = seed.datasets.len(), file = ?path, "Loaded dataset seed");
    Ok(seed.datasets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogc_common::ServiceType;

    #[test]
    fn missing_dir_gives_builtins() {
        let config = PortalConfig::load_from_dir(Path::new("/nonexistent/portal-config")).unwrap();
        assert_eq!(config.services.len(), 5);
        assert_eq!(config.provider, ProviderInfo::default());
    }

    #[test]
    fn overrides_replace_by_code() {
        let mut custom = ServiceConfig::new("s104", "Tide Levels");
        custom.capabilities.clear();
        let extra = ServiceConfig::new("S999", "Experimental");

        let merged = merge_overrides(default_configs(), vec![custom, extra]);
        assert_eq!(merged.len(), 6);
        let s104 = merged.iter().find(|c| c.service_code == "s104").unwrap();
        assert_eq!(s104.service_name, "Tide Levels");
        assert!(!s104.supports(ServiceType::Wms));
        assert_eq!(merged[5].service_code, "S999");
    }
}
