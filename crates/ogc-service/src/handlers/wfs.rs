use async_trait::async_trait;
use catalog::DatasetRecord;
use ogc_common::{BoundingBox, Feature, FeatureCollection, Geometry, OgcError, OgcResult, ServiceType};
use ogc_protocol::{Extensions, GmlEncoder, RawQuery, RequestParameters, ServiceConfig};
use serde_json::json;
use tracing::{debug, instrument};

use super::{finish, guarded, is_verb, unsupported, HandlerContext, OgcRequest, ProtocolHandler};
use crate::response::ServiceResponse;

/// Feature encodings a WFS can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFormat {
    GeoJson,
    Gml,
}

impl FeatureFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "geojson" | "json" | "application/json" => Some(FeatureFormat::GeoJson),
            "gml" | "gml3" | "application/gml+xml" | "text/xml" => Some(FeatureFormat::Gml),
            _ => None,
        }
    }

    /// Requested format, provided the product declares its family.
    pub fn negotiate(requested: &str, config: &ServiceConfig) -> OgcResult<Self> {
        let format = Self::parse(requested)
            .ok_or_else(|| OgcError::UnsupportedOutputFormat(requested.to_string()))?;
        let declared = match &config.wfs {
            Some(options) if !options.supported_output_formats.is_empty() => options
                .supported_output_formats
                .iter()
                .any(|name| Self::parse(name) == Some(format)),
            _ => true,
        };
        if declared {
            Ok(format)
        } else {
            Err(OgcError::UnsupportedOutputFormat(requested.to_string()))
        }
    }
}

/// Validated GetFeature input handed to a [`FeatureGenerator`].
pub struct FeatureRequest<'a> {
    pub config: &'a ServiceConfig,
    pub params: &'a RequestParameters,
    pub datasets: &'a [DatasetRecord],
}

impl FeatureRequest<'_> {
    pub fn extension(&self, name: &str) -> Option<&str> {
        self.params.extensions.get(name)
    }
}

/// Product hook for WFS. The handler applies bbox filtering and the
/// `maxFeatures` limit to whatever the hook returns.
#[async_trait]
pub trait FeatureGenerator: Send + Sync {
    fn extend_params(&self, _query: &RawQuery, _extensions: &mut Extensions) {}

    async fn generate_features(&self, request: &FeatureRequest<'_>) -> OgcResult<FeatureCollection>;
}

pub struct WfsHandler<G> {
    ctx: HandlerContext,
    generator: G,
}

/// Point: contained. Polygon: any exterior-ring vertex contained.
/// Every other geometry, and features without one, are dropped.
pub fn feature_in_bbox(feature: &Feature, bbox: &BoundingBox) -> bool {
    match &feature.geometry {
        Some(Geometry::Point { coordinates }) if coordinates.len() >= 2 => {
            bbox.contains_point(coordinates[0], coordinates[1])
        }
        Some(Geometry::Polygon { coordinates }) => coordinates.first().is_some_and(|ring| {
            ring.iter()
                .any(|p| p.len() >= 2 && bbox.contains_point(p[0], p[1]))
        }),
        _ => false,
    }
}

impl<G: FeatureGenerator> WfsHandler<G> {
    pub fn new(ctx: HandlerContext, generator: G) -> Self {
        Self { ctx, generator }
    }

    async fn get_feature(&self, params: &RequestParameters) -> OgcResult<ServiceResponse> {
        let wfs = params
            .wfs()
            .ok_or_else(|| OgcError::GenerationFailure("WFS parameters missing".to_string()))?;
        let max_features = wfs.max_features()?;
        let format = FeatureFormat::negotiate(&wfs.output_format, &self.ctx.config)?;
        let bbox = params.bounding_box()?;

        let datasets = self.ctx.find_datasets(&self.ctx.filter(params)).await?;
        let request = FeatureRequest {
            config: &self.ctx.config,
            params,
            datasets: &datasets,
        };
        let generated = guarded(self.generator.generate_features(&request)).await?;

        let mut features = generated.features;
        if let Some(bbox) = bbox {
            features.retain(|f| feature_in_bbox(f, &bbox));
        }
        let total = features.len();
        features.truncate(max_features);
        debug!(total, returned = features.len(), "Features selected");

        match format {
            FeatureFormat::GeoJson => {
                let mut collection = FeatureCollection::new().with_features(features);
                collection.crs = Some(json!({
                    "type": "name",
                    "properties": { "name": "EPSG:4326" }
                }));
                collection.metadata = Some(json!({
                    "totalFeatures": total,
                    "returnedFeatures": collection.len(),
                    "datasets": datasets
                        .iter()
                        .map(|d| json!({ "id": d.id, "name": d.name, "node": d.node.name }))
                        .collect::<Vec<_>>(),
                }));
                Ok(ServiceResponse::json(serde_json::to_value(&collection)?))
            }
            FeatureFormat::Gml => {
                let collection = FeatureCollection::new().with_features(features);
                let encoder = GmlEncoder::new(&self.ctx.config.service_code);
                Ok(ServiceResponse::gml(encoder.encode(&collection)))
            }
        }
    }
}

#[async_trait]
impl<G: FeatureGenerator> ProtocolHandler for WfsHandler<G> {
    fn service_type(&self) -> ServiceType {
        ServiceType::Wfs
    }

    #[instrument(skip(self, request), fields(product = %self.ctx.code()))]
    async fn handle(&self, request: &OgcRequest) -> ServiceResponse {
        let mut params = RequestParameters::extract(ServiceType::Wfs, &request.query, &self.ctx.config);
        self.generator.extend_params(&request.query, &mut params.extensions);

        let result = if is_verb(&params, "GetCapabilities") {
            self.ctx.capabilities(ServiceType::Wfs, &request.base_url)
        } else if is_verb(&params, "GetFeature") {
            self.get_feature(&params).await
        } else {
            Err(unsupported(ServiceType::Wfs, &params))
        };
        finish(self.ctx.code(), ServiceType::Wfs, super::verb(&params), result)
    }
}
