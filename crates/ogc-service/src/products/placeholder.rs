//! WMS-only products without a renderer of their own (S-104, S-111, S-124).

use async_trait::async_trait;
use bytes::Bytes;
use chart_renderer::{Canvas, Color, RasterFormat, SvgDocument};
use ogc_common::{OgcError, OgcResult, ServiceType};
use ogc_protocol::{Capability, Extensions, RawQuery, ServiceConfig};

use crate::handlers::{MapGenerator, MapRequest};

const BACKGROUND: Color = Color::rgb(0xf0, 0xf8, 0xff);
const BORDER: Color = Color::rgb(0x4a, 0x90, 0xe2);
const TEXT: Color = Color::rgb(0x2c, 0x3e, 0x50);

fn wms_product(
    code: &str,
    name: &str,
    subject: &str,
    styles: &[&str],
    optional: &[&str],
) -> ServiceConfig {
    let standard = format!("S-{}", code.trim_start_matches('S'));
    let endpoint = format!("/api/{}/wms", code.to_ascii_lowercase());
    ServiceConfig::new(code, name)
        .with_description(format!("{} Service based on {} standard", subject, standard))
        .with_formats(&["image/png", "image/jpeg", "image/svg+xml"])
        .with_default_format("image/png")
        .with_crs(&["EPSG:4326", "EPSG:3857"])
        .with_styles(styles)
        .with_transparent_default(true)
        .with_capability(
            Capability::new(ServiceType::Wms, "Web Map Service", endpoint)
                .with_description(format!("Web Map Service for {} {} visualization", standard, subject))
                .with_optional_parameters(optional),
        )
}

pub fn s104_config() -> ServiceConfig {
    wms_product(
        "S104",
        "S-104 Water Level Information",
        "Water Level Information",
        &["default", "contours", "gradient"],
        &["time", "datum"],
    )
}

pub fn s111_config() -> ServiceConfig {
    wms_product(
        "S111",
        "S-111 Surface Currents",
        "Surface Currents",
        &["default", "arrows", "streamlines"],
        &["time", "depth"],
    )
}

pub fn s124_config() -> ServiceConfig {
    wms_product(
        "S124",
        "S-124 Navigational Warnings",
        "Navigational Warnings",
        &["default", "priority", "category"],
        &["time", "warningType", "priority"],
    )
}

/// Draws a card naming the product and the number of matched datasets.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderMap {
    passthrough: Vec<String>,
}

impl PlaceholderMap {
    /// Keep the capability's optional parameters as request extensions.
    pub fn for_config(config: &ServiceConfig) -> Self {
        let passthrough = config
            .capability(ServiceType::Wms)
            .map(|c| c.optional_parameters.clone())
            .unwrap_or_default();
        Self { passthrough }
    }
}

pub fn dataset_label(count: usize) -> String {
    format!("{} dataset(s)", count)
}

#[async_trait]
impl MapGenerator for PlaceholderMap {
    fn extend_params(&self, query: &RawQuery, extensions: &mut Extensions) {
        for name in &self.passthrough {
            if let Some(value) = query.get(name) {
                extensions.insert(name.as_str(), value);
            }
        }
    }

    async fn generate_map(&self, request: &MapRequest<'_>) -> OgcResult<Bytes> {
        let (w, h) = (request.width as f64, request.height as f64);
        if request.format.eq_ignore_ascii_case("image/svg+xml") {
            let mut svg = SvgDocument::new(request.width, request.height);
            svg.background(BACKGROUND)
                .rect(1.0, 1.0, (w - 2.0).max(0.0), (h - 2.0).max(0.0), BACKGROUND, Some(BORDER))
                .centered_text(w / 2.0, h / 2.0 - 20.0, 16, TEXT, &request.config.service_name)
                .text(w / 2.0 - 30.0, h / 2.0 + 5.0, 12, TEXT, &dataset_label(request.datasets.len()))
                .text(w / 2.0 - 35.0, h / 2.0 + 25.0, 10, BORDER, "WMS Service");
            return Ok(Bytes::from(svg.finish()));
        }

        let format = RasterFormat::from_mime(request.format)
            .ok_or_else(|| OgcError::UnsupportedOutputFormat(request.format.to_string()))?;
        let (width, height) = (request.width as usize, request.height as usize);
        let mut canvas = Canvas::new(width, height)?;
        canvas.fill(BACKGROUND);
        canvas.stroke_rect(0, 0, width as i64 - 1, height as i64 - 1, BORDER);
        Ok(Bytes::from(canvas.encode(format)?))
    }
}
