//! S-101 Electronic Navigational Chart.
//!
//! WMS renders a chart overview (dataset coverage, safety contour) as a
//! raster or SVG document; WFS serves each dataset's coverage features
//! enriched with dataset and survey attributes.

use async_trait::async_trait;
use bytes::Bytes;
use catalog::DatasetRecord;
use chart_renderer::{
    march_squares, Canvas, Color, DepthGrid, RasterFormat, Segment, SvgDocument, Viewport,
};
use ogc_common::{BoundingBox, Feature, FeatureCollection, Geometry, OgcError, OgcResult, ServiceType};
use ogc_protocol::{Capability, Extensions, RawQuery, ServiceConfig, WfsOptions};
use serde_json::Value;
use tracing::{debug, warn};

use crate::handlers::{FeatureGenerator, FeatureRequest, MapGenerator, MapRequest};

pub const CODE: &str = "S101";

const MAP_PARAMS: [&str; 4] = ["featureType", "safetyContour", "shallowContour", "deepContour"];
const FEATURE_PARAMS: [&str; 3] = ["featureCode", "safetyDepth", "qualityOfSurvey"];

const DEFAULT_SAFETY_CONTOUR: f32 = 10.0;
const DEFAULT_FEATURE_CODE: &str = "DEPARE";
const DEFAULT_SAFETY_DEPTH: f64 = 10.5;
const DEFAULT_QUALITY_OF_SURVEY: &str = "Zone of Confidence A";

/// Half-size in degrees of the area assumed around a node without coverage.
const NODE_MARGIN: f64 = 0.1;

/// Upper bound on the depth grid sampled for SVG isolines.
const SVG_GRID_CELLS: usize = 96;

pub fn config() -> ServiceConfig {
    ServiceConfig::new(CODE, "S-101 Electronic Navigational Chart")
        .with_description("Electronic Navigational Chart Service based on S-101 standard")
        .with_formats(&["image/png", "image/jpeg", "image/svg+xml"])
        .with_default_format("image/png")
        .with_crs(&["EPSG:4326", "EPSG:3857"])
        .with_styles(&["default", "nautical", "simplified"])
        .with_transparent_default(true)
        .with_wfs(WfsOptions {
            supported_output_formats: vec!["GeoJSON".to_string(), "GML".to_string()],
            default_output_format: Some("GeoJSON".to_string()),
            max_features_default: Some(1000),
        })
        .with_capability(
            Capability::new(ServiceType::Wms, "Web Map Service", "/api/s101/wms")
                .with_description(
                    "Web Map Service for S-101 Electronic Navigational Chart data visualization",
                )
                .with_optional_parameters(&["time", "elevation"]),
        )
        .with_capability(
            Capability::new(ServiceType::Wfs, "Web Feature Service", "/api/s101/wfs")
                .with_description("Web Feature Service for S-101 Electronic Navigational Chart feature data")
                .with_optional_parameters(&["dataset", "filter"]),
        )
}

/// Display name of an S-57/S-101 feature acronym.
pub fn feature_type_name(code: &str) -> &'static str {
    match code {
        "DEPARE" => "Depth Area",
        "BOYLAT" => "Lateral Buoy",
        "LIGHTS" => "Light",
        "BUOY" => "Buoy",
        "SOUNDG" => "Sounding",
        "COALNE" => "Coastline",
        "DEPCNT" => "Depth Contour",
        "OBSTRN" => "Obstruction",
        _ => "Unknown",
    }
}

/// Area assumed for a dataset without coverage: a small square around its
/// node, or the Shanghai approach when the node has no location.
fn fallback_area(dataset: &DatasetRecord) -> BoundingBox {
    match (dataset.node.longitude, dataset.node.latitude) {
        (Some(lon), Some(lat)) => BoundingBox::new(
            lon - NODE_MARGIN,
            lat - NODE_MARGIN,
            lon + NODE_MARGIN,
            lat + NODE_MARGIN,
        ),
        _ => BoundingBox::new(121.0, 31.0, 121.5, 31.5),
    }
}

/// Coverage features of `dataset`; unparseable or empty coverage yields an
/// empty list.
fn coverage_features(dataset: &DatasetRecord) -> Vec<Feature> {
    match dataset.coverage_features() {
        Ok(features) => features,
        Err(err) => {
            warn!(dataset = %dataset.id, error = %err, "Unparseable coverage payload");
            Vec::new()
        }
    }
}

fn own_feature_code(feature: &Feature) -> &str {
    feature.property_str("featureCode").unwrap_or(DEFAULT_FEATURE_CODE)
}

// ---------------------------------------------------------------------------
// WMS
// ---------------------------------------------------------------------------

struct ChartStyle {
    sea: Color,
    shoal: Option<Color>,
    coverage_fill: Color,
    coverage_line: Color,
    safety_contour: Color,
    depth_contour: Color,
    text: Color,
}

impl ChartStyle {
    fn named(style: &str) -> Self {
        match style {
            "nautical" => Self {
                sea: Color::rgb(0xc9, 0xe7, 0xf8),
                shoal: Some(Color::rgb(0x8c, 0xc8, 0xe8)),
                coverage_fill: Color::rgb(0x4a, 0x90, 0xe2).with_alpha(60),
                coverage_line: Color::rgb(0x2c, 0x5a, 0xa0),
                safety_contour: Color::rgb(0x2c, 0x3e, 0x50),
                depth_contour: Color::rgb(0x7f, 0x8c, 0x8d),
                text: Color::rgb(0x2c, 0x3e, 0x50),
            },
            "simplified" => Self {
                sea: Color::rgb(0xff, 0xff, 0xff),
                shoal: None,
                coverage_fill: Color::rgb(0xdd, 0xdd, 0xdd).with_alpha(80),
                coverage_line: Color::rgb(0x88, 0x88, 0x88),
                safety_contour: Color::rgb(0x55, 0x55, 0x55),
                depth_contour: Color::rgb(0xaa, 0xaa, 0xaa),
                text: Color::rgb(0x33, 0x33, 0x33),
            },
            _ => Self {
                sea: Color::rgb(0xe6, 0xf3, 0xff),
                shoal: None,
                coverage_fill: Color::rgb(0x4a, 0x90, 0xe2).with_alpha(77),
                coverage_line: Color::rgb(0x2c, 0x5a, 0xa0),
                safety_contour: Color::rgb(0xd8, 0x43, 0x15),
                depth_contour: Color::rgb(0xff, 0xff, 0xff),
                text: Color::rgb(0x2c, 0x3e, 0x50),
            },
        }
    }
}

/// Contour depths requested for one GetMap, in metres below datum.
struct Contours {
    safety: f32,
    extra: Vec<f32>,
}

impl Contours {
    fn from_request(request: &MapRequest<'_>) -> OgcResult<Self> {
        let ext = &request.params.extensions;
        let safety = ext.parse::<f32>("safetyContour")?.unwrap_or(DEFAULT_SAFETY_CONTOUR);
        let extra = [ext.parse::<f32>("shallowContour")?, ext.parse::<f32>("deepContour")?]
            .into_iter()
            .flatten()
            .collect();
        Ok(Self { safety, extra })
    }
}

/// Isolines of the synthetic seabed at `depth`, in pixel space.
fn isolines(grid: &DepthGrid, depth: f32, width: u32, height: u32) -> Vec<Segment> {
    let sx = width as f64 / (grid.width.max(2) - 1) as f64;
    let sy = height as f64 / (grid.height.max(2) - 1) as f64;
    march_squares(grid, -depth.abs())
        .iter()
        .map(|s| s.scaled(sx, sy))
        .collect()
}

/// Geometries drawn for one dataset, optionally narrowed to a feature code.
fn chart_geometries(dataset: &DatasetRecord, feature_type: Option<&str>) -> Vec<Geometry> {
    let features = coverage_features(dataset);
    if features.is_empty() {
        if feature_type.is_some_and(|code| code != DEFAULT_FEATURE_CODE) {
            return Vec::new();
        }
        let area = dataset.extent().unwrap_or_else(|| fallback_area(dataset));
        return vec![Geometry::rectangle(&area)];
    }
    features
        .into_iter()
        .filter(|f| feature_type.map_or(true, |code| own_feature_code(f) == code))
        .filter_map(|f| f.geometry)
        .collect()
}

/// Renders the S-101 chart overview.
#[derive(Debug, Default, Clone, Copy)]
pub struct S101Map;

impl S101Map {
    fn render_raster(&self, request: &MapRequest<'_>, format: RasterFormat) -> OgcResult<Bytes> {
        let style = ChartStyle::named(request.style());
        let contours = Contours::from_request(request)?;
        let (width, height) = (request.width as usize, request.height as usize);
        let viewport = Viewport::new(request.bbox, width, height);
        let mut canvas = Canvas::new(width, height)?;

        if !(request.transparent() && format == RasterFormat::Png) {
            canvas.fill(style.sea);
        }

        let grid = DepthGrid::synthetic(request.bbox, width, height);
        if let Some(shoal) = style.shoal {
            let level = -contours.safety.abs();
            for row in 0..height {
                for col in 0..width {
                    if grid.get(col, row) >= level {
                        canvas.blend(col as i64, row as i64, shoal);
                    }
                }
            }
        }

        let feature_type = request.extension("featureType");
        for dataset in request.datasets {
            for geometry in chart_geometries(dataset, feature_type) {
                draw_geometry(&mut canvas, &viewport, &geometry, &style);
            }
        }

        for depth in &contours.extra {
            for s in isolines(&grid, *depth, request.width, request.height) {
                canvas.polyline(&[s.start, s.end], style.depth_contour);
            }
        }
        for s in isolines(&grid, contours.safety, request.width, request.height) {
            canvas.polyline(&[s.start, s.end], style.safety_contour);
        }

        Ok(Bytes::from(canvas.encode(format)?))
    }

    fn render_svg(&self, request: &MapRequest<'_>) -> OgcResult<Bytes> {
        let style = ChartStyle::named(request.style());
        let contours = Contours::from_request(request)?;
        let (width, height) = (request.width, request.height);
        let viewport = Viewport::new(request.bbox, width as usize, height as usize);
        let mut svg = SvgDocument::new(width, height);

        if !request.transparent() {
            svg.background(style.sea);
        }

        svg.group("coverage");
        let feature_type = request.extension("featureType");
        for dataset in request.datasets {
            for geometry in chart_geometries(dataset, feature_type) {
                svg_geometry(&mut svg, &viewport, &geometry, &style);
            }
        }
        svg.end_group();

        let grid = DepthGrid::synthetic(
            request.bbox,
            (width as usize).clamp(2, SVG_GRID_CELLS),
            (height as usize).clamp(2, SVG_GRID_CELLS),
        );
        svg.group("depth-contours");
        for depth in &contours.extra {
            for s in isolines(&grid, *depth, width, height) {
                svg.polyline(&[s.start, s.end], style.depth_contour, 1.0, Some("5,3"));
            }
        }
        svg.end_group();
        svg.group("safety-contour");
        for s in isolines(&grid, contours.safety, width, height) {
            svg.polyline(&[s.start, s.end], style.safety_contour, 2.0, None);
        }
        svg.end_group();

        let b = &request.bbox;
        svg.centered_text(width as f64 / 2.0, 30.0, 16, style.text, &request.config.service_name)
            .group("dataset-info")
            .rect(10.0, 44.0, 220.0, 66.0, Color::rgb(0xff, 0xff, 0xff).with_alpha(230), Some(Color::rgb(0xdd, 0xdd, 0xdd)))
            .text(20.0, 62.0, 10, style.text, &format!("Datasets: {}", request.datasets.len()))
            .text(20.0, 76.0, 10, style.text, &format!("Style: {}", request.style()))
            .text(20.0, 90.0, 10, style.text, &format!("Safety contour: {} m", contours.safety))
            .text(
                20.0,
                104.0,
                10,
                style.text,
                &format!("Extent: {:.2},{:.2} - {:.2},{:.2}", b.min_x, b.min_y, b.max_x, b.max_y),
            )
            .end_group();

        Ok(Bytes::from(svg.finish()))
    }
}

fn draw_geometry(canvas: &mut Canvas, viewport: &Viewport, geometry: &Geometry, style: &ChartStyle) {
    match geometry {
        Geometry::Polygon { coordinates } => {
            if let Some(ring) = coordinates.first() {
                let points = viewport.project_all(ring.iter().map(Vec::as_slice));
                canvas.fill_polygon(&points, style.coverage_fill);
                canvas.polyline(&points, style.coverage_line);
            }
        }
        Geometry::MultiPolygon { coordinates } => {
            for polygon in coordinates {
                draw_geometry(canvas, viewport, &Geometry::Polygon { coordinates: polygon.clone() }, style);
            }
        }
        Geometry::LineString { coordinates } => {
            let points = viewport.project_all(coordinates.iter().map(Vec::as_slice));
            canvas.polyline(&points, style.coverage_line);
        }
        Geometry::Point { coordinates } if coordinates.len() >= 2 => {
            let (x, y) = viewport.project(coordinates[0], coordinates[1]);
            let (x, y) = (x.round() as i64, y.round() as i64);
            canvas.fill_rect(x - 2, y - 2, x + 2, y + 2, style.coverage_line);
        }
        Geometry::GeometryCollection { geometries } => {
            for g in geometries {
                draw_geometry(canvas, viewport, g, style);
            }
        }
        _ => {}
    }
}

fn svg_geometry(svg: &mut SvgDocument, viewport: &Viewport, geometry: &Geometry, style: &ChartStyle) {
    match geometry {
        Geometry::Polygon { coordinates } => {
            if let Some(ring) = coordinates.first() {
                let points = viewport.project_all(ring.iter().map(Vec::as_slice));
                svg.polygon(&points, style.coverage_fill, style.coverage_line);
            }
        }
        Geometry::MultiPolygon { coordinates } => {
            for polygon in coordinates {
                svg_geometry(svg, viewport, &Geometry::Polygon { coordinates: polygon.clone() }, style);
            }
        }
        Geometry::LineString { coordinates } => {
            let points = viewport.project_all(coordinates.iter().map(Vec::as_slice));
            svg.polyline(&points, style.coverage_line, 1.5, None);
        }
        Geometry::Point { coordinates } if coordinates.len() >= 2 => {
            let (x, y) = viewport.project(coordinates[0], coordinates[1]);
            svg.circle(x, y, 4.0, style.coverage_line);
        }
        Geometry::GeometryCollection { geometries } => {
            for g in geometries {
                svg_geometry(svg, viewport, g, style);
            }
        }
        _ => {}
    }
}

#[async_trait]
impl MapGenerator for S101Map {
    fn extend_params(&self, query: &RawQuery, extensions: &mut Extensions) {
        extensions.copy_from(query, &MAP_PARAMS);
    }

    async fn generate_map(&self, request: &MapRequest<'_>) -> OgcResult<Bytes> {
        if request.format.eq_ignore_ascii_case("image/svg+xml") {
            return self.render_svg(request);
        }
        let format = RasterFormat::from_mime(request.format)
            .ok_or_else(|| OgcError::UnsupportedOutputFormat(request.format.to_string()))?;
        self.render_raster(request, format)
    }
}

// ---------------------------------------------------------------------------
// WFS
// ---------------------------------------------------------------------------

/// Serves dataset coverage as S-101 features.
#[derive(Debug, Default, Clone, Copy)]
pub struct S101Features;

struct SurveyOverrides<'a> {
    safety_depth: Option<f64>,
    quality_of_survey: Option<&'a str>,
}

fn placeholder_feature(dataset: &DatasetRecord) -> Feature {
    let mut feature = Feature::new(Some(Geometry::rectangle(&fallback_area(dataset))))
        .with_property("name", dataset.name.clone())
        .with_property("featureType", feature_type_name(DEFAULT_FEATURE_CODE));
    if let Some(description) = &dataset.description {
        feature = feature.with_property("description", description.clone());
    }
    feature
}

fn enrich(mut feature: Feature, index: usize, dataset: &DatasetRecord, overrides: &SurveyOverrides<'_>) -> Feature {
    if feature.id.is_none() {
        feature.id = Some(format!("{}_{}", dataset.id, index).into());
    }

    let code = own_feature_code(&feature).to_string();
    let props = &mut feature.properties;
    props.insert("datasetId".into(), Value::from(dataset.id.clone()));
    props.insert("datasetName".into(), Value::from(dataset.name.clone()));
    props.insert("nodeId".into(), Value::from(dataset.node.id.clone()));
    props.insert("nodeName".into(), Value::from(dataset.node.name.clone()));
    props.insert("productType".into(), Value::from(dataset.product_type.clone()));
    props.insert("version".into(), Value::from(dataset.version.clone()));
    if let Some(published) = dataset.published_at {
        props.insert("publishedAt".into(), Value::from(published.to_rfc3339()));
    }
    props.insert("featureCode".into(), Value::from(code.clone()));
    props
        .entry("featureType")
        .or_insert_with(|| Value::from(feature_type_name(&code)));

    match overrides.safety_depth {
        Some(depth) => {
            props.insert("safetyDepth".into(), Value::from(depth));
        }
        None => {
            props.entry("safetyDepth").or_insert(Value::from(DEFAULT_SAFETY_DEPTH));
        }
    }
    match overrides.quality_of_survey {
        Some(quality) => {
            props.insert("qualityOfSurvey".into(), Value::from(quality));
        }
        None => {
            props
                .entry("qualityOfSurvey")
                .or_insert(Value::from(DEFAULT_QUALITY_OF_SURVEY));
        }
    }
    props.entry("scaleMinimum").or_insert(Value::from(50_000));
    props.entry("scaleMaximum").or_insert(Value::from(5_000_000));
    props.entry("horizontalDatum").or_insert(Value::from("WGS84"));
    props.entry("verticalDatum").or_insert(Value::from("Mean Sea Level"));
    feature
}

#[async_trait]
impl FeatureGenerator for S101Features {
    fn extend_params(&self, query: &RawQuery, extensions: &mut Extensions) {
        extensions.copy_from(query, &FEATURE_PARAMS);
    }

    async fn generate_features(&self, request: &FeatureRequest<'_>) -> OgcResult<FeatureCollection> {
        let overrides = SurveyOverrides {
            safety_depth: request.params.extensions.parse::<f64>("safetyDepth")?,
            quality_of_survey: request.extension("qualityOfSurvey"),
        };
        let feature_code = request.extension("featureCode");

        let mut features = Vec::new();
        for dataset in request.datasets {
            let mut source = coverage_features(dataset);
            if source.is_empty() {
                source.push(placeholder_feature(dataset));
            }
            features.extend(
                source
                    .into_iter()
                    .enumerate()
                    .map(|(index, f)| enrich(f, index, dataset, &overrides))
                    .filter(|f| feature_code.map_or(true, |code| f.property_str("featureCode") == Some(code))),
            );
        }
        debug!(datasets = request.datasets.len(), features = features.len(), "S-101 features generated");
        Ok(FeatureCollection::new().with_features(features))
    }
}
