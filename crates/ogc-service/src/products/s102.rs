//! S-102 High Resolution Bathymetry.
//!
//! Both protocols work from the synthetic seabed of [`DepthGrid::synthetic`]:
//! WMS colours it through a named scale, WCS resamples it to the requested
//! grid and encodes it as GeoTIFF, NetCDF CDL or raw float32 samples.

use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use chart_renderer::{
    encode_cdl, encode_geotiff, march_squares, CdlMetadata, ColorScale, DepthGrid, Interpolation,
    RasterFormat,
};
use chrono::{DateTime, Utc};
use ogc_common::{OgcError, OgcResult, ServiceType};
use ogc_protocol::{Capability, Extensions, RawQuery, ServiceConfig, WcsOptions};
use tracing::debug;

use crate::handlers::{CoverageGenerator, CoverageRequest, MapGenerator, MapRequest};

pub const CODE: &str = "S102";

const MAP_PARAMS: [&str; 5] = ["colorScale", "time", "elevation", "resolution", "verticalDatum"];
const COVERAGE_PARAMS: [&str; 5] = [
    "resolution",
    "verticalDatum",
    "horizontalDatum",
    "depthRange",
    "interpolation",
];

const DEFAULT_COLOR_SCALE: &str = "viridis";
const CONTOUR_INTERVAL: f32 = 5.0;

pub fn config() -> ServiceConfig {
    let mut wms = Capability::new(ServiceType::Wms, "Web Map Service", "/api/s102/wms")
        .with_description("Web Map Service for S-102 High Resolution Bathymetric Data visualization")
        .with_optional_parameters(&["time", "elevation"]);
    wms.supported_parameters.push("colorScale".to_string());

    ServiceConfig::new(CODE, "S-102 High Resolution Bathymetry")
        .with_description("High Resolution Bathymetric Data Service based on S-102 standard")
        .with_formats(&["image/png", "image/jpeg"])
        .with_default_format("image/png")
        .with_crs(&["EPSG:4326", "EPSG:3857"])
        .with_styles(&["default", "contours", "shaded_relief", "hillshade", "slope"])
        .with_transparent_default(true)
        .with_wcs(WcsOptions {
            supported_coverage_formats: ["GeoTIFF", "NetCDF", "GRIB", "HDF5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_coverage_format: Some("GeoTIFF".to_string()),
            supported_interpolations: ["nearest", "bilinear", "cubic"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_interpolation: Some("nearest".to_string()),
        })
        .with_capability(wms)
        .with_capability(
            Capability::new(ServiceType::Wcs, "Web Coverage Service", "/api/s102/wcs")
                .with_description("Web Coverage Service for S-102 High Resolution Bathymetric Data access")
                .with_optional_parameters(&["time", "interpolation", "resolution"]),
        )
}

/// RFC 3339 `time` parameter, if supplied.
fn parse_time(raw: Option<&str>) -> OgcResult<Option<DateTime<Utc>>> {
    raw.map(|value| {
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| OgcError::invalid("time", format!("'{}' is not an RFC 3339 timestamp", value)))
    })
    .transpose()
}

/// `min,max` depth window in metres.
fn parse_depth_range(raw: &str) -> OgcResult<(f32, f32)> {
    let invalid = || OgcError::invalid("depthRange", format!("expected 'min,max', got '{}'", raw));
    let (lo, hi) = raw.split_once(',').ok_or_else(invalid)?;
    let lo: f32 = lo.trim().parse().map_err(|_| invalid())?;
    let hi: f32 = hi.trim().parse().map_err(|_| invalid())?;
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(invalid());
    }
    Ok((lo, hi))
}

/// Lambertian shading for a light at azimuth 315°, altitude 45°; 0..=1.
fn hillshade(grid: &DepthGrid) -> Vec<f32> {
    let (w, h) = (grid.width, grid.height);
    let azimuth = (360.0f32 - 315.0 + 90.0).to_radians();
    let zenith = (90.0f32 - 45.0).to_radians();
    let mut shade = vec![1.0f32; w * h];
    if w < 3 || h < 3 {
        return shade;
    }
    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let dzdx = (grid.get(col + 1, row) - grid.get(col - 1, row)) / 2.0;
            let dzdy = (grid.get(col, row + 1) - grid.get(col, row - 1)) / 2.0;
            let slope = (dzdx * dzdx + dzdy * dzdy).sqrt().atan();
            let aspect = dzdy.atan2(-dzdx);
            let value = zenith.cos() * slope.cos() + zenith.sin() * slope.sin() * (azimuth - aspect).cos();
            shade[row * w + col] = value.clamp(0.0, 1.0);
        }
    }
    shade
}

/// Gradient magnitude per cell, normalised to 0..=1.
fn slope(grid: &DepthGrid) -> Vec<f32> {
    let (w, h) = (grid.width, grid.height);
    let mut out = vec![0.0f32; w * h];
    for row in 0..h {
        for col in 0..w {
            let dx = grid.get((col + 1).min(w - 1), row) - grid.get(col.saturating_sub(1), row);
            let dy = grid.get(col, (row + 1).min(h - 1)) - grid.get(col, row.saturating_sub(1));
            out[row * w + col] = (dx * dx + dy * dy).sqrt();
        }
    }
    let max = out.iter().cloned().fold(0.0f32, f32::max);
    if max > 0.0 {
        out.iter_mut().for_each(|v| *v /= max);
    }
    out
}

fn shade_pixels(pixels: &mut [u8], factors: &[f32], strength: f32) {
    for (px, f) in pixels.chunks_exact_mut(4).zip(factors) {
        let k = 1.0 - strength + strength * f;
        for c in &mut px[..3] {
            *c = (*c as f32 * k).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Paint isolines every `CONTOUR_INTERVAL` metres in white.
fn draw_contours(pixels: &mut [u8], grid: &DepthGrid) {
    let Some((min, max)) = grid.range() else {
        return;
    };
    let mut level = (max / CONTOUR_INTERVAL).floor() * CONTOUR_INTERVAL;
    while level >= min {
        for segment in march_squares(grid, level) {
            for (x, y) in [segment.start, segment.end] {
                let col = (x.round() as usize).min(grid.width - 1);
                let row = (y.round() as usize).min(grid.height - 1);
                let i = (row * grid.width + col) * 4;
                pixels[i..i + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        level -= CONTOUR_INTERVAL;
    }
}

/// Colours the synthetic seabed for GetMap.
#[derive(Debug, Default, Clone, Copy)]
pub struct S102Map;

#[async_trait]
impl MapGenerator for S102Map {
    fn extend_params(&self, query: &RawQuery, extensions: &mut Extensions) {
        extensions.copy_from(query, &MAP_PARAMS);
        if extensions.get("colorScale").is_none() {
            extensions.insert("colorScale", DEFAULT_COLOR_SCALE);
        }
    }

    async fn generate_map(&self, request: &MapRequest<'_>) -> OgcResult<Bytes> {
        let scale_name = request.extension("colorScale").unwrap_or(DEFAULT_COLOR_SCALE);
        let scale = ColorScale::from_str(scale_name).map_err(|msg| OgcError::invalid("colorScale", msg))?;
        parse_time(request.extension("time"))?;
        request.params.extensions.parse::<f64>("elevation")?;
        let format = RasterFormat::from_mime(request.format)
            .ok_or_else(|| OgcError::UnsupportedOutputFormat(request.format.to_string()))?;

        let (width, height) = (request.width as usize, request.height as usize);
        let grid = DepthGrid::synthetic(request.bbox, width, height);
        let mut pixels = grid.render(scale);
        match request.style() {
            "contours" => draw_contours(&mut pixels, &grid),
            "shaded_relief" => shade_pixels(&mut pixels, &hillshade(&grid), 0.5),
            "hillshade" => shade_pixels(&mut pixels, &hillshade(&grid), 0.9),
            "slope" => {
                pixels = slope(&grid)
                    .iter()
                    .flat_map(|t| {
                        let c = scale.sample(*t);
                        [c.r, c.g, c.b, c.a]
                    })
                    .collect();
            }
            _ => {}
        }
        debug!(scale = %scale, style = request.style(), width, height, "S-102 depth map rendered");

        Ok(Bytes::from(format.encode(&pixels, width, height)?))
    }
}

/// Extracts gridded bathymetry for GetCoverage.
#[derive(Debug, Default, Clone, Copy)]
pub struct S102Coverage;

#[async_trait]
impl CoverageGenerator for S102Coverage {
    fn extend_params(&self, query: &RawQuery, extensions: &mut Extensions) {
        extensions.copy_from(query, &COVERAGE_PARAMS);
    }

    async fn generate_coverage(&self, request: &CoverageRequest<'_>) -> OgcResult<Bytes> {
        let method = Interpolation::from_str(request.interpolation)
            .map_err(|msg| OgcError::invalid("interpolation", msg))?;
        let time = parse_time(request.time())?;
        let depth_range = request.extension("depthRange").map(parse_depth_range).transpose()?;

        let (native_w, native_h) = self.native_grid();
        let native = DepthGrid::synthetic(request.bbox, native_w as usize, native_h as usize);
        let mut grid = native.resample(request.width as usize, request.height as usize, method);
        if let Some((lo, hi)) = depth_range {
            grid.values.iter_mut().for_each(|v| *v = v.clamp(lo, hi));
        }
        debug!(
            coverage = request.coverage_id,
            format = request.format,
            interpolation = method.name(),
            width = grid.width,
            height = grid.height,
            "S-102 coverage extracted"
        );

        let payload = match request.format.to_ascii_lowercase().as_str() {
            "geotiff" => encode_geotiff(&grid)?,
            "netcdf" => {
                let meta = CdlMetadata {
                    dataset_name: request
                        .datasets
                        .first()
                        .map(|d| d.name.clone())
                        .unwrap_or_else(|| request.coverage_id.to_string()),
                    title: request.config.service_name.clone(),
                    time: time.unwrap_or_else(Utc::now).timestamp(),
                    vertical_datum: request.extension("verticalDatum").map(str::to_string),
                    resolution: request.extension("resolution").map(str::to_string),
                };
                encode_cdl(&grid, &meta).into_bytes()
            }
            // No GRIB2 / HDF5 writer: the float32 samples are served as-is.
            "grib" | "hdf5" => grid.to_le_bytes(),
            other => return Err(OgcError::UnsupportedOutputFormat(other.to_string())),
        };
        Ok(Bytes::from(payload))
    }
}
