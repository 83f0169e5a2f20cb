//! Common test fixtures for the OGC dispatch tests.

use std::sync::Arc;

use catalog::{DatasetRecord, DatasetStatus, InMemoryCatalog, NodeRef};
use chrono::{TimeZone, Utc};
use ogc_common::{BoundingBox, Feature, FeatureCollection, ServiceType};
use ogc_protocol::{Capability, ProviderInfo, ServiceConfig, WcsOptions, WfsOptions};
use serde_json::json;

/// Common bounding box definitions for testing.
pub mod bbox {
    use ogc_common::BoundingBox;

    /// Yangtze estuary approach.
    pub fn shanghai() -> BoundingBox {
        BoundingBox::new(120.0, 30.0, 122.0, 32.0)
    }

    /// Pearl River approach; disjoint from `shanghai()`.
    pub fn hong_kong() -> BoundingBox {
        BoundingBox::new(113.8, 22.1, 114.5, 22.6)
    }

    pub fn world() -> BoundingBox {
        BoundingBox::new(-180.0, -90.0, 180.0, 90.0)
    }
}

pub fn node(id: &str, name: &str) -> NodeRef {
    NodeRef {
        id: id.to_string(),
        name: name.to_string(),
        latitude: None,
        longitude: None,
    }
}

/// Published dataset of `product` on the Shanghai node.
pub fn dataset(id: &str, name: &str, product: &str) -> DatasetRecord {
    DatasetRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        product_type: product.to_string(),
        version: "1.0.0".to_string(),
        status: DatasetStatus::Published,
        coverage: None,
        bbox: None,
        node: node("node-sh", "Shanghai MSA"),
        published_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
    }
}

pub fn with_bbox(mut record: DatasetRecord, bbox: BoundingBox) -> DatasetRecord {
    record.bbox = Some(bbox);
    record
}

pub fn with_status(mut record: DatasetRecord, status: DatasetStatus) -> DatasetRecord {
    record.status = status;
    record
}

pub fn with_coverage(mut record: DatasetRecord, coverage: &FeatureCollection) -> DatasetRecord {
    record.coverage = Some(serde_json::to_string(coverage).unwrap());
    record
}

/// A collection of point features, ids `p0`, `p1`, ...
pub fn points(positions: &[(f64, f64)]) -> FeatureCollection {
    let features = positions
        .iter()
        .enumerate()
        .map(|(i, (lon, lat))| Feature::point(*lon, *lat).with_id(format!("p{}", i)))
        .collect();
    FeatureCollection::new().with_features(features)
}

/// Raw GeoJSON FeatureCollection text, as stored in a coverage column.
pub fn coverage_json(positions: &[(f64, f64)]) -> String {
    let features: Vec<_> = positions
        .iter()
        .map(|(lon, lat)| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [lon, lat] },
                "properties": {}
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

pub fn catalog(records: Vec<DatasetRecord>) -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::with_records(records))
}

pub fn provider() -> Arc<ProviderInfo> {
    Arc::new(ProviderInfo::default())
}

/// A product exposing all three protocols with small, explicit settings.
pub fn test_config(code: &str) -> ServiceConfig {
    let lower = code.to_ascii_lowercase();
    ServiceConfig::new(code, format!("{} Test Product", code))
        .with_description(format!("{} fixture", code))
        .with_formats(&["image/png", "image/svg+xml"])
        .with_default_format("image/svg+xml")
        .with_crs(&["EPSG:4326", "EPSG:3857"])
        .with_styles(&["default", "night"])
        .with_wfs(WfsOptions {
            supported_output_formats: vec!["GeoJSON".to_string(), "GML".to_string()],
            default_output_format: Some("GeoJSON".to_string()),
            max_features_default: Some(100),
        })
        .with_wcs(WcsOptions {
            supported_coverage_formats: vec!["GeoTIFF".to_string(), "NetCDF".to_string()],
            default_coverage_format: Some("GeoTIFF".to_string()),
            supported_interpolations: vec!["nearest".to_string(), "bilinear".to_string()],
            default_interpolation: Some("nearest".to_string()),
        })
        .with_capability(Capability::new(ServiceType::Wms, "Test WMS", format!("/api/{}/wms", lower)))
        .with_capability(Capability::new(ServiceType::Wfs, "Test WFS", format!("/api/{}/wfs", lower)))
        .with_capability(Capability::new(ServiceType::Wcs, "Test WCS", format!("/api/{}/wcs", lower)))
}

/// Owned query pairs.
pub fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
