//! OGC WMS / WFS / WCS protocol building blocks.
//!
//! Everything here is synchronous and side-effect free:
//! - product service configuration (`ServiceConfig`, `Capability`, `ProviderInfo`)
//! - query parameter extraction with configuration defaults
//! - capabilities documents, GML feature encoding and WCS coverage descriptions

pub mod capabilities;
pub mod config;
pub mod coverage;
pub mod gml;
pub mod params;
pub mod xml;

pub use capabilities::CapabilitiesDocument;
pub use config::{
    Capability, ConfigError, ProviderInfo, ServiceConfig, WcsOptions, WfsOptions,
};
pub use coverage::{CoverageDescription, CoverageSummary};
pub use gml::GmlEncoder;
pub use params::{
    Extensions, ProtocolParameters, RawQuery, RequestParameters, WcsParameters, WfsParameters,
    WmsParameters,
};
