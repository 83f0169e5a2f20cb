//! Built-in maritime products and their default registration.

pub mod placeholder;
pub mod s101;
pub mod s102;

use std::sync::Arc;

use catalog::DatasetLookup;
use ogc_common::ServiceType;
use ogc_protocol::{ProviderInfo, ServiceConfig};
use tracing::info;

use crate::product::Product;
use crate::registry::{RegistryError, ServiceRegistry};

pub use placeholder::PlaceholderMap;
pub use s101::{S101Features, S101Map};
pub use s102::{S102Coverage, S102Map};

/// Every built-in product declaration.
pub fn default_configs() -> Vec<ServiceConfig> {
    vec![
        s101::config(),
        s102::config(),
        placeholder::s104_config(),
        placeholder::s111_config(),
        placeholder::s124_config(),
    ]
}

/// Compose the product for `config`, attaching a handler for each declared
/// capability the product has a generator for.
pub fn build_product(
    config: ServiceConfig,
    provider: Arc<ProviderInfo>,
    catalog: Arc<dyn DatasetLookup>,
) -> Product {
    let code = config.service_code.to_ascii_uppercase();
    let wms = config.supports(ServiceType::Wms);
    let wfs = config.supports(ServiceType::Wfs);
    let wcs = config.supports(ServiceType::Wcs);
    let placeholder = PlaceholderMap::for_config(&config);

    let mut builder = Product::builder(config, provider, catalog);
    match code.as_str() {
        s101::CODE => {
            if wms {
                builder = builder.wms(S101Map);
            }
            if wfs {
                builder = builder.wfs(S101Features);
            }
        }
        s102::CODE => {
            if wms {
                builder = builder.wms(S102Map);
            }
            if wcs {
                builder = builder.wcs(S102Coverage);
            }
        }
        _ => {
            if wms {
                builder = builder.wms(placeholder);
            }
        }
    }
    builder.build()
}

/// Build and register one product per config; returns how many were registered.
pub async fn register_defaults(
    registry: &ServiceRegistry,
    configs: Vec<ServiceConfig>,
    provider: Arc<ProviderInfo>,
    catalog: Arc<dyn DatasetLookup>,
) -> Result<usize, RegistryError> {
    let mut registered = 0;
    for config in configs {
        let product = build_product(config, provider.clone(), catalog.clone());
        registry.register(Arc::new(product)).await?;
        registered += 1;
    }
    info!(registered, "Products registered");
    Ok(registered)
}
