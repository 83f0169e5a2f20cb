//! Protocol handlers: the shared WMS / WFS / WCS request pipeline.
//!
//! Each handler owns the dispatch for one protocol and delegates the
//! product-specific part to a generator hook:
//!
//! ```text
//! RawQuery -> RequestParameters (+ extensions) -> verb
//!   GetCapabilities          -> CapabilitiesDocument
//!   GetMap / GetFeature /
//!   GetCoverage / Describe.. -> validate -> DatasetLookup -> hook -> response
//!   anything else            -> 400
//! ```

mod wcs;
mod wfs;
mod wms;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use catalog::{DatasetFilter, DatasetLookup, DatasetRecord};
use futures::FutureExt;
use ogc_common::{OgcError, OgcResult, ServiceType};
use ogc_protocol::{CapabilitiesDocument, ProviderInfo, RawQuery, RequestParameters, ServiceConfig};
use tracing::{debug, error, warn};

use crate::response::ServiceResponse;

pub use wcs::{coverage_content_type, CoverageGenerator, CoverageRequest, WcsHandler};
pub use wfs::{feature_in_bbox, FeatureFormat, FeatureGenerator, FeatureRequest, WfsHandler};
pub use wms::{MapGenerator, MapRequest, WmsHandler};

/// One inbound OGC request.
#[derive(Debug, Clone, Default)]
pub struct OgcRequest {
    /// Used for self-references in capabilities documents.
    pub base_url: String,
    pub query: RawQuery,
}

impl OgcRequest {
    pub fn new(base_url: impl Into<String>, query: RawQuery) -> Self {
        Self {
            base_url: base_url.into(),
            query,
        }
    }

    pub fn from_pairs<I, K, V>(base_url: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::new(base_url, RawQuery::from_pairs(pairs))
    }
}

/// Request dispatcher for one protocol of one product.
#[async_trait]
pub trait ProtocolHandler: Send + Sync {
    fn service_type(&self) -> ServiceType;

    /// Never fails: every error is rendered as an error envelope.
    async fn handle(&self, request: &OgcRequest) -> ServiceResponse;
}

/// Collaborators shared by the handlers of one product.
#[derive(Clone)]
pub struct HandlerContext {
    pub config: Arc<ServiceConfig>,
    pub provider: Arc<ProviderInfo>,
    pub catalog: Arc<dyn DatasetLookup>,
}

impl HandlerContext {
    pub fn new(
        config: Arc<ServiceConfig>,
        provider: Arc<ProviderInfo>,
        catalog: Arc<dyn DatasetLookup>,
    ) -> Self {
        Self {
            config,
            provider,
            catalog,
        }
    }

    pub fn code(&self) -> &str {
        &self.config.service_code
    }

    pub(crate) fn capabilities(&self, service_type: ServiceType, base_url: &str) -> OgcResult<ServiceResponse> {
        let capability = self
            .config
            .capability(service_type)
            .ok_or_else(|| OgcError::MissingCapability {
                product: self.config.service_code.clone(),
                service: service_type,
            })?;
        let document = CapabilitiesDocument::new(base_url, capability, &self.config, &self.provider);
        Ok(ServiceResponse::xml(document.render()))
    }

    /// Published datasets of this product narrowed by `dataset` / `datasetId`.
    pub(crate) fn filter(&self, params: &RequestParameters) -> DatasetFilter {
        DatasetFilter::published(self.config.service_code.as_str())
            .with_name(params.dataset.as_deref())
            .with_id(params.dataset_id.as_deref())
    }

    /// Run the lookup; an empty result is a 404.
    pub(crate) async fn find_datasets(&self, filter: &DatasetFilter) -> OgcResult<Vec<DatasetRecord>> {
        let datasets = self.catalog.find(filter).await?;
        debug!(product = %self.code(), matched = datasets.len(), "Dataset lookup complete");
        if datasets.is_empty() {
            return Err(OgcError::NoMatchingDatasets(format!(
                "no published {} datasets match the request",
                self.config.service_code
            )));
        }
        Ok(datasets)
    }
}

/// Request verb as supplied, empty when absent.
pub(crate) fn verb(params: &RequestParameters) -> &str {
    params.request.as_deref().unwrap_or("")
}

pub(crate) fn is_verb(params: &RequestParameters, expected: &str) -> bool {
    verb(params).eq_ignore_ascii_case(expected)
}

pub(crate) fn unsupported(service: ServiceType, params: &RequestParameters) -> OgcError {
    OgcError::UnsupportedRequest {
        service,
        request: match verb(params) {
            "" => "<missing>".to_string(),
            other => other.to_string(),
        },
    }
}

/// Run a generation hook, turning a panic into `GenerationFailure`.
pub(crate) async fn guarded<T, F>(hook: F) -> OgcResult<T>
where
    F: Future<Output = OgcResult<T>>,
{
    match AssertUnwindSafe(hook).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "generation hook panicked".to_string());
            Err(OgcError::GenerationFailure(message))
        }
    }
}

/// Log the outcome and convert errors into the envelope.
pub(crate) fn finish(
    product: &str,
    service: ServiceType,
    request: &str,
    result: OgcResult<ServiceResponse>,
) -> ServiceResponse {
    match result {
        Ok(response) => {
            debug!(
                product = %product,
                service = %service,
                request = %request,
                content_type = %response.content_type,
                "Request served"
            );
            response
        }
        Err(err) if err.is_client_error() => {
            warn!(
                product = %product,
                service = %service,
                request = %request,
                status = err.status_code(),
                code = err.exception_code(),
                error = %err,
                "Request rejected"
            );
            ServiceResponse::from_error(&err)
        }
        Err(err) => {
            error!(
                product = %product,
                service = %service,
                request = %request,
                status = err.status_code(),
                error = %err,
                "Request failed"
            );
            ServiceResponse::from_error(&err)
        }
    }
}
