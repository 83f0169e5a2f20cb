//! End-to-end tests of the built-in maritime products.

use std::sync::Arc;

use catalog::DatasetLookup;
use ogc_common::{Feature, FeatureCollection, ServiceType};
use ogc_protocol::ServiceConfig;
use ogc_service::products::{placeholder, s101, s102};
use ogc_service::{build_product, OgcRequest, Product, ProductService, ServiceResponse};
use serde_json::Value;
use test_utils::{
    assert_well_formed, bbox, catalog, count_elements, dataset, provider, with_bbox, with_coverage,
};

const BASE_URL: &str = "https://portal.example.org";

// ============================================================================
// Helper functions
// ============================================================================

fn product(config: ServiceConfig, lookup: Arc<dyn DatasetLookup>) -> Product {
    build_product(config, provider(), lookup)
}

fn request(pairs: &[(&str, &str)]) -> OgcRequest {
    OgcRequest::from_pairs(BASE_URL, pairs.iter().copied())
}

fn map_request(format: &str, extra: &[(&str, &str)]) -> OgcRequest {
    let mut pairs = vec![
        ("service", "WMS"),
        ("request", "GetMap"),
        ("bbox", "120,30,122,32"),
        ("width", "64"),
        ("height", "48"),
        ("format", format),
    ];
    pairs.extend_from_slice(extra);
    request(&pairs)
}

fn coverage_request(format: &str, extra: &[(&str, &str)]) -> OgcRequest {
    let mut pairs = vec![
        ("service", "WCS"),
        ("request", "GetCoverage"),
        ("coverageId", "s102-ds"),
        ("bbox", "120,30,122,32"),
        ("width", "16"),
        ("height", "8"),
        ("format", format),
    ];
    pairs.extend_from_slice(extra);
    request(&pairs)
}

fn body_text(response: &ServiceResponse) -> String {
    String::from_utf8(response.body_bytes().to_vec()).unwrap()
}

fn body_json(response: &ServiceResponse) -> Value {
    serde_json::from_slice(&response.body_bytes()).unwrap()
}

fn s101_catalog() -> Arc<dyn DatasetLookup> {
    let coverage = FeatureCollection::new().with_features(vec![
        Feature::point(121.2, 31.2)
            .with_id("light-1")
            .with_property("featureCode", "LIGHTS"),
        Feature::point(121.4, 31.4).with_id("area-1"),
    ]);
    catalog(vec![with_coverage(
        with_bbox(dataset("enc-1", "Yangtze Approach", "S101"), bbox::shanghai()),
        &coverage,
    )])
}

fn s102_catalog() -> Arc<dyn DatasetLookup> {
    catalog(vec![with_bbox(dataset("s102-ds", "Yangtze Bathymetry", "S102"), bbox::shanghai())])
}

// ============================================================================
// S-101
// ============================================================================

#[tokio::test]
async fn test_s101_svg_chart() {
    let product = product(s101::config(), s101_catalog());
    let response = product
        .handle_request(&map_request("image/svg+xml", &[("styles", "nautical")]), ServiceType::Wms)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/svg+xml");
    let svg = body_text(&response);
    assert_well_formed(&svg);
    assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
    assert!(svg.contains("S-101 Electronic Navigational Chart"));
}

#[tokio::test]
async fn test_s101_raster_formats() {
    let product = product(s101::config(), s101_catalog());

    let png = product.handle_request(&map_request("image/png", &[]), ServiceType::Wms).await;
    assert_eq!(png.status, 200);
    assert_eq!(png.content_type, "image/png");
    assert_eq!(&png.body_bytes()[..8], b"\x89PNG\r\n\x1a\n");

    let jpeg = product.handle_request(&map_request("image/jpeg", &[]), ServiceType::Wms).await;
    assert_eq!(jpeg.status, 200);
    assert_eq!(jpeg.content_type, "image/jpeg");
    assert_eq!(&jpeg.body_bytes()[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_s101_rejects_bad_contour_depth() {
    let product = product(s101::config(), s101_catalog());
    let response = product
        .handle_request(&map_request("image/png", &[("safetyContour", "deep")]), ServiceType::Wms)
        .await;

    assert_eq!(response.status, 400);
    assert!(response.error_message().unwrap().contains("safetyContour"));
}

#[tokio::test]
async fn test_s101_features_are_enriched() {
    let product = product(s101::config(), s101_catalog());
    let response = product
        .handle_request(
            &request(&[("service", "WFS"), ("request", "GetFeature"), ("safetyDepth", "7.5")]),
            ServiceType::Wfs,
        )
        .await;

    assert_eq!(response.status, 200);
    let body = body_json(&response);
    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);

    let light = &features[0]["properties"];
    assert_eq!(light["datasetId"], "enc-1");
    assert_eq!(light["nodeName"], "Shanghai MSA");
    assert_eq!(light["productType"], "S101");
    assert_eq!(light["featureCode"], "LIGHTS");
    assert_eq!(light["featureType"], "Light");
    assert_eq!(light["safetyDepth"], 7.5);
    assert_eq!(light["horizontalDatum"], "WGS84");

    // no own code: the depth-area default
    assert_eq!(features[1]["properties"]["featureCode"], "DEPARE");
}

#[tokio::test]
async fn test_s101_feature_code_filter() {
    let product = product(s101::config(), s101_catalog());
    let response = product
        .handle_request(
            &request(&[("request", "GetFeature"), ("featureCode", "LIGHTS"), ("outputFormat", "GML")]),
            ServiceType::Wfs,
        )
        .await;

    assert_eq!(response.status, 200);
    let xml = body_text(&response);
    assert_well_formed(&xml);
    assert_eq!(count_elements(&xml, "gml:Point"), 1);
    assert!(xml.contains("light-1"));
}

#[tokio::test]
async fn test_s101_has_no_coverage_service() {
    let product = product(s101::config(), s101_catalog());
    let response = product
        .handle_request(&coverage_request("GeoTIFF", &[]), ServiceType::Wcs)
        .await;
    assert_eq!(response.status, 404);
}

// ============================================================================
// S-102
// ============================================================================

#[tokio::test]
async fn test_s102_color_scales() {
    let product = product(s102::config(), s102_catalog());

    let response = product
        .handle_request(&map_request("image/png", &[("colorScale", "plasma"), ("styles", "hillshade")]), ServiceType::Wms)
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(&response.body_bytes()[..4], b"\x89PNG");

    let response = product
        .handle_request(&map_request("image/png", &[("colorScale", "rainbow")]), ServiceType::Wms)
        .await;
    assert_eq!(response.status, 400);
    assert!(response.error_message().unwrap().contains("colorScale"));
}

#[tokio::test]
async fn test_s102_has_no_svg_output() {
    let product = product(s102::config(), s102_catalog());
    let response = product
        .handle_request(&map_request("image/svg+xml", &[]), ServiceType::Wms)
        .await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_s102_geotiff_coverage() {
    let product = product(s102::config(), s102_catalog());
    let response = product
        .handle_request(&coverage_request("GeoTIFF", &[("interpolation", "bilinear")]), ServiceType::Wcs)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/tiff");
    assert_eq!(&response.body_bytes()[..4], b"II*\0");
}

#[tokio::test]
async fn test_s102_netcdf_coverage_carries_time() {
    let product = product(s102::config(), s102_catalog());
    let response = product
        .handle_request(
            &coverage_request("netcdf", &[("time", "2024-05-01T12:00:00Z"), ("verticalDatum", "LAT")]),
            ServiceType::Wcs,
        )
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "application/netcdf");
    let cdl = body_text(&response);
    assert!(cdl.starts_with("netcdf"));
    assert!(cdl.contains("time = 1714564800;"));
    assert!(cdl.contains("LAT"));
}

#[tokio::test]
async fn test_s102_grib_is_raw_samples() {
    let product = product(s102::config(), s102_catalog());
    let response = product
        .handle_request(&coverage_request("GRIB", &[]), ServiceType::Wcs)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "application/x-grib");
    assert_eq!(response.body_bytes().len(), 16 * 8 * 4);
}

#[tokio::test]
async fn test_s102_rejects_bad_time_and_range() {
    let product = product(s102::config(), s102_catalog());

    let response = product
        .handle_request(&coverage_request("GeoTIFF", &[("time", "last tuesday")]), ServiceType::Wcs)
        .await;
    assert_eq!(response.status, 400);

    for range in ["-5,-30", "NaN,-5", "inf,0"] {
        let response = product
            .handle_request(&coverage_request("GeoTIFF", &[("depthRange", range)]), ServiceType::Wcs)
            .await;
        assert_eq!(response.status, 400, "depthRange={}", range);
    }
}

#[tokio::test]
async fn test_s102_describe_coverage() {
    let product = product(s102::config(), s102_catalog());
    let response = product
        .handle_request(&request(&[("request", "DescribeCoverage")]), ServiceType::Wcs)
        .await;

    assert_eq!(response.status, 200);
    let xml = body_text(&response);
    assert_well_formed(&xml);
    assert_eq!(count_elements(&xml, "wcs:CoverageDescription"), 1);
    assert!(xml.contains("s102-ds"));
}

#[tokio::test]
async fn test_s102_capabilities_use_public_base() {
    let product = product(s102::config(), s102_catalog());
    let response = product
        .handle_request(&request(&[("request", "GetCapabilities")]), ServiceType::Wcs)
        .await;

    assert_eq!(response.status, 200);
    let xml = body_text(&response);
    assert_well_formed(&xml);
    assert!(xml.contains("https://portal.example.org/api/s102/wcs"));
}

// ============================================================================
// Placeholders
// ============================================================================

#[tokio::test]
async fn test_placeholder_card() {
    let lookup = catalog(vec![dataset("wl-1", "Tide Gauges", "S104")]);
    let product = product(placeholder::s104_config(), lookup);

    let response = product
        .handle_request(&map_request("image/svg+xml", &[]), ServiceType::Wms)
        .await;
    assert_eq!(response.status, 200);
    let svg = body_text(&response);
    assert!(svg.contains("S-104 Water Level Information"));
    assert!(svg.contains("1 dataset(s)"));
    assert!(svg.contains("WMS Service"));

    let response = product.handle_request(&map_request("image/png", &[]), ServiceType::Wms).await;
    assert_eq!(response.status, 200);
    assert_eq!(&response.body_bytes()[..4], b"\x89PNG");
}

#[tokio::test]
async fn test_placeholder_is_wms_only() {
    let lookup = catalog(vec![dataset("nw-1", "NAVAREA XI", "S124")]);
    let product = product(placeholder::s124_config(), lookup);

    let response = product
        .handle_request(&request(&[("request", "GetFeature")]), ServiceType::Wfs)
        .await;
    assert_eq!(response.status, 404);
    assert!(!product.handles(ServiceType::Wfs));
}

#[tokio::test]
async fn test_placeholder_without_datasets_is_404() {
    let product = product(placeholder::s111_config(), catalog(vec![]));
    let response = product
        .handle_request(&map_request("image/png", &[]), ServiceType::Wms)
        .await;
    assert_eq!(response.status, 404);
}
