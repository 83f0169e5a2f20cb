//! Static per-product service configuration.
//!
//! A `ServiceConfig` is declared once at startup (in code or YAML) and shared
//! read-only by every protocol handler of the product.

use ogc_common::ServiceType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("service code must not be empty")]
    EmptyServiceCode,

    #[error("{code}: default format '{format}' is not a supported format")]
    UnknownDefaultFormat { code: String, format: String },

    #[error("{code}: capability {service} declared more than once")]
    DuplicateCapability { code: String, service: ServiceType },

    #[error("{code}: capability {service} has an empty endpoint")]
    EmptyEndpoint { code: String, service: ServiceType },
}

/// One protocol a product exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub endpoint: String,
    #[serde(default)]
    pub supported_parameters: Vec<String>,
    #[serde(default)]
    pub optional_parameters: Vec<String>,
}

impl Capability {
    /// Capability with the protocol-standard parameter list.
    pub fn new(service_type: ServiceType, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let standard: &[&str] = match service_type {
            ServiceType::Wms => &[
                "service", "version", "request", "layers", "styles", "crs", "bbox", "width",
                "height", "format", "transparent",
            ],
            ServiceType::Wfs => &[
                "service", "version", "request", "typeName", "bbox", "maxFeatures",
                "outputFormat",
            ],
            ServiceType::Wcs => &[
                "service", "version", "request", "coverageId", "bbox", "width", "height",
                "format", "crs",
            ],
        };
        Self {
            service_type,
            name: name.into(),
            description: String::new(),
            endpoint: endpoint.into(),
            supported_parameters: standard.iter().map(|s| s.to_string()).collect(),
            optional_parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_optional_parameters(mut self, names: &[&str]) -> Self {
        self.optional_parameters = names.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// WFS-only settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WfsOptions {
    pub supported_output_formats: Vec<String>,
    #[serde(default)]
    pub default_output_format: Option<String>,
    #[serde(default)]
    pub max_features_default: Option<usize>,
}

/// WCS-only settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WcsOptions {
    pub supported_coverage_formats: Vec<String>,
    #[serde(default)]
    pub default_coverage_format: Option<String>,
    #[serde(default)]
    pub supported_interpolations: Vec<String>,
    #[serde(default)]
    pub default_interpolation: Option<String>,
}

/// Immutable descriptor of one maritime product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub service_code: String,
    pub service_name: String,
    #[serde(default)]
    pub service_description: String,
    /// Map image MIME types, in preference order.
    #[serde(default)]
    pub supported_formats: Vec<String>,
    /// Overrides "first supported format wins".
    #[serde(default)]
    pub default_format: Option<String>,
    #[serde(default)]
    pub supported_crs: Vec<String>,
    #[serde(default)]
    pub supported_styles: Vec<String>,
    #[serde(default)]
    pub default_style: Option<String>,
    #[serde(default)]
    pub transparent_default: bool,
    #[serde(default)]
    pub wfs: Option<WfsOptions>,
    #[serde(default)]
    pub wcs: Option<WcsOptions>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl ServiceConfig {
    pub fn new(service_code: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            service_code: service_code.into(),
            service_name: service_name.into(),
            service_description: String::new(),
            supported_formats: Vec::new(),
            default_format: None,
            supported_crs: vec!["EPSG:4326".to_string()],
            supported_styles: vec!["default".to_string()],
            default_style: None,
            transparent_default: false,
            wfs: None,
            wcs: None,
            capabilities: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.service_description = description.into();
        self
    }

    pub fn with_formats(mut self, formats: &[&str]) -> Self {
        self.supported_formats = formats.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    pub fn with_crs(mut self, crs: &[&str]) -> Self {
        self.supported_crs = crs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_styles(mut self, styles: &[&str]) -> Self {
        self.supported_styles = styles.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_transparent_default(mut self, transparent: bool) -> Self {
        self.transparent_default = transparent;
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_wfs(mut self, options: WfsOptions) -> Self {
        self.wfs = Some(options);
        self
    }

    pub fn with_wcs(mut self, options: WcsOptions) -> Self {
        self.wcs = Some(options);
        self
    }

    /// Explicit default format, else the first supported one.
    pub fn default_format(&self) -> Option<&str> {
        self.default_format
            .as_deref()
            .or_else(|| self.supported_formats.first().map(String::as_str))
    }

    pub fn default_crs(&self) -> &str {
        self.supported_crs
            .first()
            .map(String::as_str)
            .unwrap_or("EPSG:4326")
    }

    pub fn default_style(&self) -> &str {
        self.default_style
            .as_deref()
            .or_else(|| self.supported_styles.first().map(String::as_str))
            .unwrap_or("default")
    }

    pub fn capability(&self, service_type: ServiceType) -> Option<&Capability> {
        self.capabilities
            .iter()
            .find(|c| c.service_type == service_type)
    }

    pub fn supports(&self, service_type: ServiceType) -> bool {
        self.capability(service_type).is_some()
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.supported_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    /// Check the declaration is internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_code.trim().is_empty() {
            return Err(ConfigError::EmptyServiceCode);
        }
        if let Some(format) = &self.default_format {
            if !self.supports_format(format) {
                return Err(ConfigError::UnknownDefaultFormat {
                    code: self.service_code.clone(),
                    format: format.clone(),
                });
            }
        }
        let mut seen = Vec::new();
        for cap in &self.capabilities {
            if seen.contains(&cap.service_type) {
                return Err(ConfigError::DuplicateCapability {
                    code: self.service_code.clone(),
                    service: cap.service_type,
                });
            }
            if cap.endpoint.trim().is_empty() {
                return Err(ConfigError::EmptyEndpoint {
                    code: self.service_code.clone(),
                    service: cap.service_type,
                });
            }
            seen.push(cap.service_type);
        }
        Ok(())
    }
}

/// Organisation published in the `ServiceProvider` block of capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderInfo {
    pub name: String,
    pub site: String,
    pub contact_name: String,
    pub contact_position: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub country: String,
}

impl Default for ProviderInfo {
    fn default() -> Self {
        Self {
            name: "S-100 Maritime Services".to_string(),
            site: "https://api.s100-services.com".to_string(),
            contact_name: "Service Administrator".to_string(),
            contact_position: "Administrator".to_string(),
            phone: "+86-21-12345678".to_string(),
            email: "admin@s100-services.org".to_string(),
            city: "Shanghai".to_string(),
            country: "China".to_string(),
        }
    }
}
