//! Product composition: one configuration plus one handler per protocol.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use catalog::DatasetLookup;
use ogc_common::{OgcError, ServiceType};
use ogc_protocol::{Capability, ProviderInfo, ServiceConfig};
use tracing::warn;

use crate::handlers::{
    CoverageGenerator, FeatureGenerator, HandlerContext, MapGenerator, OgcRequest, ProtocolHandler,
    WcsHandler, WfsHandler, WmsHandler,
};
use crate::response::ServiceResponse;

/// What the registry stores for each product code.
#[async_trait]
pub trait ProductService: Send + Sync {
    fn config(&self) -> &ServiceConfig;

    fn capabilities(&self) -> &[Capability] {
        &self.config().capabilities
    }

    /// True when a handler serves `service_type`.
    fn handles(&self, service_type: ServiceType) -> bool;

    async fn handle_request(&self, request: &OgcRequest, service_type: ServiceType) -> ServiceResponse;
}

pub struct Product {
    config: Arc<ServiceConfig>,
    handlers: HashMap<ServiceType, Box<dyn ProtocolHandler>>,
}

impl Product {
    pub fn builder(
        config: ServiceConfig,
        provider: Arc<ProviderInfo>,
        catalog: Arc<dyn DatasetLookup>,
    ) -> ProductBuilder {
        ProductBuilder::new(config, provider, catalog)
    }

    pub fn code(&self) -> &str {
        &self.config.service_code
    }
}

#[async_trait]
impl ProductService for Product {
    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn handles(&self, service_type: ServiceType) -> bool {
        self.handlers.contains_key(&service_type)
    }

    async fn handle_request(&self, request: &OgcRequest, service_type: ServiceType) -> ServiceResponse {
        match self.handlers.get(&service_type) {
            Some(handler) => handler.handle(request).await,
            None => {
                let err = OgcError::MissingCapability {
                    product: self.config.service_code.clone(),
                    service: service_type,
                };
                warn!(product = %self.code(), service = %service_type, "No handler for service type");
                ServiceResponse::from_error(&err)
            }
        }
    }
}

/// Attaches generators to a product. Handlers are keyed by the protocol they
/// implement, so a WMS capability is only ever served by a WMS handler.
pub struct ProductBuilder {
    ctx: HandlerContext,
    handlers: HashMap<ServiceType, Box<dyn ProtocolHandler>>,
}

impl ProductBuilder {
    pub fn new(config: ServiceConfig, provider: Arc<ProviderInfo>, catalog: Arc<dyn DatasetLookup>) -> Self {
        Self {
            ctx: HandlerContext::new(Arc::new(config), provider, catalog),
            handlers: HashMap::new(),
        }
    }

    pub fn handler(mut self, handler: Box<dyn ProtocolHandler>) -> Self {
        self.handlers.insert(handler.service_type(), handler);
        self
    }

    pub fn wms<G: MapGenerator + 'static>(self, generator: G) -> Self {
        let handler = WmsHandler::new(self.ctx.clone(), generator);
        self.handler(Box::new(handler))
    }

    pub fn wfs<G: FeatureGenerator + 'static>(self, generator: G) -> Self {
        let handler = WfsHandler::new(self.ctx.clone(), generator);
        self.handler(Box::new(handler))
    }

    pub fn wcs<G: CoverageGenerator + 'static>(self, generator: G) -> Self {
        let handler = WcsHandler::new(self.ctx.clone(), generator);
        self.handler(Box::new(handler))
    }

    pub fn build(self) -> Product {
        Product {
            config: self.ctx.config,
            handlers: self.handlers,
        }
    }
}
