//! Error taxonomy for OGC request dispatch.

use crate::service_type::ServiceType;
use thiserror::Error;

/// Result type alias using OgcError.
pub type OgcResult<T> = Result<T, OgcError>;

/// Every failure a protocol handler can report to the router.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OgcError {
    // === Registry / configuration ===
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("{service} capability not available for {product}")]
    MissingCapability { product: String, service: ServiceType },

    // === Request errors ===
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingRequiredParameters(Vec<String>),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unsupported {service} request type: {request}")]
    UnsupportedRequest { service: ServiceType, request: String },

    #[error("Unsupported output format: {0}")]
    UnsupportedOutputFormat(String),

    // === Data errors ===
    #[error("No datasets found for {0}")]
    NoMatchingDatasets(String),

    #[error("Failed to generate response: {0}")]
    GenerationFailure(String),
}

impl OgcError {
    /// OGC exception code reported alongside the message.
    pub fn exception_code(&self) -> &'static str {
        match self {
            OgcError::MissingRequiredParameters(_) => "MissingParameterValue",
            OgcError::InvalidParameter { .. } => "InvalidParameterValue",
            OgcError::UnsupportedRequest { .. } => "OperationNotSupported",
            OgcError::UnsupportedOutputFormat(_) => "InvalidFormat",
            OgcError::MissingCapability { .. } | OgcError::ServiceNotFound(_) => {
                "ServiceNotAvailable"
            }
            OgcError::NoMatchingDatasets(_) => "NoApplicableData",
            OgcError::GenerationFailure(_) => "NoApplicableCode",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OgcError::MissingRequiredParameters(_)
            | OgcError::InvalidParameter { .. }
            | OgcError::UnsupportedRequest { .. }
            | OgcError::UnsupportedOutputFormat(_) => 400,

            OgcError::ServiceNotFound(_)
            | OgcError::MissingCapability { .. }
            | OgcError::NoMatchingDatasets(_) => 404,

            OgcError::GenerationFailure(_) => 500,
        }
    }

    /// True for faults caused by the client request.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        OgcError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for OgcError {
    fn from(err: serde_json::Error) -> Self {
        OgcError::GenerationFailure(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_name_the_whole_set() {
        let err = OgcError::MissingRequiredParameters(vec!["bbox".into(), "width".into()]);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Missing required parameters: bbox, width");
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        let missing = OgcError::MissingCapability {
            product: "S101".into(),
            service: ServiceType::Wcs,
        };
        assert_eq!(missing.status_code(), 404);
        assert_eq!(OgcError::NoMatchingDatasets("S101".into()).status_code(), 404);
        assert_eq!(OgcError::UnsupportedOutputFormat("KML".into()).status_code(), 400);
        assert_eq!(OgcError::GenerationFailure("boom".into()).status_code(), 500);
        assert!(!OgcError::GenerationFailure("boom".into()).is_client_error());
    }
}
