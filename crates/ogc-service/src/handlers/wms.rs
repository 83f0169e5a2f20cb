use async_trait::async_trait;
use bytes::Bytes;
use catalog::DatasetRecord;
use ogc_common::{BoundingBox, OgcError, OgcResult, ServiceType};
use ogc_protocol::{Extensions, RawQuery, RequestParameters, ServiceConfig};
use tracing::instrument;

use super::{finish, guarded, is_verb, unsupported, HandlerContext, OgcRequest, ProtocolHandler};
use crate::response::ServiceResponse;

const REQUIRED: [&str; 3] = ["bbox", "width", "height"];

/// Validated GetMap input handed to a [`MapGenerator`].
pub struct MapRequest<'a> {
    pub config: &'a ServiceConfig,
    pub params: &'a RequestParameters,
    pub bbox: BoundingBox,
    pub width: u32,
    pub height: u32,
    /// One of the configured formats, in its configured spelling.
    pub format: &'a str,
    pub datasets: &'a [DatasetRecord],
}

impl MapRequest<'_> {
    pub fn style(&self) -> &str {
        self.params.wms().map(|p| p.styles.as_str()).unwrap_or("default")
    }

    pub fn transparent(&self) -> bool {
        self.params.wms().map(|p| p.transparent).unwrap_or(false)
    }

    pub fn extension(&self, name: &str) -> Option<&str> {
        self.params.extensions.get(name)
    }
}

/// Product hook for WMS.
#[async_trait]
pub trait MapGenerator: Send + Sync {
    /// Copy product-specific query parameters into `extensions`.
    fn extend_params(&self, _query: &RawQuery, _extensions: &mut Extensions) {}

    async fn generate_map(&self, request: &MapRequest<'_>) -> OgcResult<Bytes>;
}

pub struct WmsHandler<G> {
    ctx: HandlerContext,
    generator: G,
}

impl<G: MapGenerator> WmsHandler<G> {
    pub fn new(ctx: HandlerContext, generator: G) -> Self {
        Self { ctx, generator }
    }

    async fn get_map(&self, params: &RequestParameters) -> OgcResult<ServiceResponse> {
        params.require(&REQUIRED)?;
        let bbox = params
            .bounding_box()?
            .ok_or_else(|| OgcError::MissingRequiredParameters(vec!["bbox".to_string()]))?;
        let (width, height) = params.dimensions()?;

        let requested = params
            .format
            .as_deref()
            .ok_or_else(|| OgcError::MissingRequiredParameters(vec!["format".to_string()]))?;
        let format = self
            .ctx
            .config
            .supported_formats
            .iter()
            .find(|f| f.eq_ignore_ascii_case(requested))
            .ok_or_else(|| OgcError::UnsupportedOutputFormat(requested.to_string()))?;

        let filter = self.ctx.filter(params).with_bbox(Some(bbox));
        let datasets = self.ctx.find_datasets(&filter).await?;

        let request = MapRequest {
            config: &self.ctx.config,
            params,
            bbox,
            width,
            height,
            format,
            datasets: &datasets,
        };
        let image = guarded(self.generator.generate_map(&request)).await?;
        Ok(ServiceResponse::binary(format.as_str(), image))
    }
}

#[async_trait]
impl<G: MapGenerator> ProtocolHandler for WmsHandler<G> {
    fn service_type(&self) -> ServiceType {
        ServiceType::Wms
    }

    #[instrument(skip(self, request), fields(product = %self.ctx.code()))]
    async fn handle(&self, request: &OgcRequest) -> ServiceResponse {
        let mut params = RequestParameters::extract(ServiceType::Wms, &request.query, &self.ctx.config);
        self.generator.extend_params(&request.query, &mut params.extensions);

        let result = if is_verb(&params, "GetCapabilities") {
            self.ctx.capabilities(ServiceType::Wms, &request.base_url)
        } else if is_verb(&params, "GetMap") {
            self.get_map(&params).await
        } else {
            Err(unsupported(ServiceType::Wms, &params))
        };
        finish(self.ctx.code(), ServiceType::Wms, super::verb(&params), result)
    }
}
