//! OGC request dispatch for S-100 maritime products.
//!
//! A [`Product`] composes one protocol handler per supported service type
//! (WMS, WFS, WCS). Handlers own the shared request pipeline: parameter
//! extraction, validation, dataset lookup and response wrapping. Products
//! only supply generation hooks ([`MapGenerator`], [`FeatureGenerator`],
//! [`CoverageGenerator`]). Products are published through the
//! [`ServiceRegistry`].

pub mod handlers;
pub mod product;
pub mod products;
pub mod registry;
pub mod response;

pub use handlers::{
    CoverageGenerator, CoverageRequest, FeatureGenerator, FeatureRequest, HandlerContext,
    MapGenerator, MapRequest, OgcRequest, ProtocolHandler, WcsHandler, WfsHandler, WmsHandler,
};
pub use product::{Product, ProductBuilder, ProductService};
pub use products::{build_product, default_configs, register_defaults};
pub use registry::{RegistryError, RegistryStatistics, ServiceHealth, ServiceRegistry};
pub use response::{ResponseBody, ServiceResponse};
