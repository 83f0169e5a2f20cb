use async_trait::async_trait;
use bytes::Bytes;
use catalog::DatasetRecord;
use ogc_common::{BoundingBox, OgcError, OgcResult, ServiceType};
use ogc_protocol::{CoverageDescription, CoverageSummary, Extensions, RawQuery, RequestParameters, ServiceConfig};
use tracing::instrument;

use super::{finish, guarded, is_verb, unsupported, HandlerContext, OgcRequest, ProtocolHandler};
use crate::response::ServiceResponse;

const REQUIRED: [&str; 4] = ["coverageId", "bbox", "width", "height"];

/// Grid size advertised for coverages without a product-specific one.
const DEFAULT_NATIVE_GRID: (u32, u32) = (512, 512);

/// Content type for a coverage format name.
pub fn coverage_content_type(format: &str) -> &'static str {
    match format.to_ascii_lowercase().as_str() {
        "geotiff" => "image/tiff",
        "netcdf" => "application/netcdf",
        "grib" => "application/x-grib",
        "hdf5" => "application/x-hdf5",
        _ => "application/octet-stream",
    }
}

/// Validated GetCoverage input handed to a [`CoverageGenerator`].
pub struct CoverageRequest<'a> {
    pub config: &'a ServiceConfig,
    pub params: &'a RequestParameters,
    pub coverage_id: &'a str,
    pub bbox: BoundingBox,
    pub width: u32,
    pub height: u32,
    /// One of the configured coverage formats, in its configured spelling.
    pub format: &'a str,
    pub interpolation: &'a str,
    pub datasets: &'a [DatasetRecord],
}

impl CoverageRequest<'_> {
    pub fn extension(&self, name: &str) -> Option<&str> {
        self.params.extensions.get(name)
    }

    pub fn time(&self) -> Option<&str> {
        self.params.wcs().and_then(|p| p.time.as_deref())
    }
}

/// Product hook for WCS.
#[async_trait]
pub trait CoverageGenerator: Send + Sync {
    fn extend_params(&self, _query: &RawQuery, _extensions: &mut Extensions) {}

    /// Native grid size reported by DescribeCoverage.
    fn native_grid(&self) -> (u32, u32) {
        DEFAULT_NATIVE_GRID
    }

    async fn generate_coverage(&self, request: &CoverageRequest<'_>) -> OgcResult<Bytes>;
}

pub struct WcsHandler<G> {
    ctx: HandlerContext,
    generator: G,
}

impl<G: CoverageGenerator> WcsHandler<G> {
    pub fn new(ctx: HandlerContext, generator: G) -> Self {
        Self { ctx, generator }
    }

    async fn describe_coverage(&self, params: &RequestParameters) -> OgcResult<ServiceResponse> {
        let fallback = params.bounding_box()?;
        let datasets = self.ctx.find_datasets(&self.ctx.filter(params)).await?;
        let (grid_width, grid_height) = self.generator.native_grid();

        let coverages: Vec<CoverageSummary> = datasets
            .iter()
            .map(|d| CoverageSummary {
                id: d.id.clone(),
                title: d.name.clone(),
                envelope: d
                    .extent()
                    .or(fallback)
                    .unwrap_or(BoundingBox::new(-180.0, -90.0, 180.0, 90.0)),
                grid_width,
                grid_height,
            })
            .collect();

        let mut description = CoverageDescription::new(&self.ctx.config, &coverages)
            .with_time(params.wcs().and_then(|p| p.time.as_deref()));
        if let Some(crs) = params.crs.as_deref() {
            description = description.with_crs(crs);
        }
        Ok(ServiceResponse::xml(description.render()))
    }

    async fn get_coverage(&self, params: &RequestParameters) -> OgcResult<ServiceResponse> {
        params.require(&REQUIRED)?;
        let wcs = params
            .wcs()
            .ok_or_else(|| OgcError::GenerationFailure("WCS parameters missing".to_string()))?;
        let bbox = params
            .bounding_box()?
            .ok_or_else(|| OgcError::MissingRequiredParameters(vec!["bbox".to_string()]))?;
        let (width, height) = params.dimensions()?;

        let options = self.ctx.config.wcs.as_ref();
        let requested = params.format.as_deref().unwrap_or("GeoTIFF");
        let format = match options {
            Some(o) if !o.supported_coverage_formats.is_empty() => o
                .supported_coverage_formats
                .iter()
                .find(|f| f.eq_ignore_ascii_case(requested))
                .map(String::as_str)
                .ok_or_else(|| OgcError::UnsupportedOutputFormat(requested.to_string()))?,
            _ => requested,
        };
        if let Some(o) = options {
            if !o.supported_interpolations.is_empty()
                && !o
                    .supported_interpolations
                    .iter()
                    .any(|i| i.eq_ignore_ascii_case(&wcs.interpolation))
            {
                return Err(OgcError::invalid(
                    "interpolation",
                    format!("'{}' is not supported", wcs.interpolation),
                ));
            }
        }

        let filter = self.ctx.filter(params).with_bbox(Some(bbox));
        let datasets = self.ctx.find_datasets(&filter).await?;

        let request = CoverageRequest {
            config: &self.ctx.config,
            params,
            coverage_id: wcs.coverage_id.as_deref().unwrap_or_default(),
            bbox,
            width,
            height,
            format,
            interpolation: &wcs.interpolation,
            datasets: &datasets,
        };
        let payload = guarded(self.generator.generate_coverage(&request)).await?;
        Ok(ServiceResponse::binary(coverage_content_type(format), payload))
    }
}

#[async_trait]
impl<G: CoverageGenerator> ProtocolHandler for WcsHandler<G> {
    fn service_type(&self) -> ServiceType {
        ServiceType::Wcs
    }

    #[instrument(skip(self, request), fields(product = %self.ctx.code()))]
    async fn handle(&self, request: &OgcRequest) -> ServiceResponse {
        let mut params = RequestParameters::extract(ServiceType::Wcs, &request.query, &self.ctx.config);
        self.generator.extend_params(&request.query, &mut params.extensions);

        let result = if is_verb(&params, "GetCapabilities") {
            self.ctx.capabilities(ServiceType::Wcs, &request.base_url)
        } else if is_verb(&params, "DescribeCoverage") {
            self.describe_coverage(&params).await
        } else if is_verb(&params, "GetCoverage") {
            self.get_coverage(&params).await
        } else {
            Err(unsupported(ServiceType::Wcs, &params))
        };
        finish(self.ctx.code(), ServiceType::Wcs, super::verb(&params), result)
    }
}
