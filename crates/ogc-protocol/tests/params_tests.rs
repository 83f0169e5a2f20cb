//! Parameter extraction against product configurations.

use ogc_common::{OgcError, ServiceType};
use ogc_protocol::{
    Capability, RawQuery, RequestParameters, ServiceConfig, WcsOptions, WfsOptions,
};

fn chart_config() -> ServiceConfig {
    ServiceConfig::new("S101", "S-101 Electronic Navigational Chart")
        .with_formats(&["image/png", "image/svg+xml"])
        .with_default_format("image/svg+xml")
        .with_crs(&["EPSG:4326", "EPSG:3857"])
        .with_styles(&["default", "nautical", "simplified"])
        .with_capability(Capability::new(ServiceType::Wms, "S-101 WMS", "/api/s101/wms"))
        .with_wfs(WfsOptions {
            supported_output_formats: vec!["GeoJSON".into(), "GML".into()],
            default_output_format: Some("GeoJSON".into()),
            max_features_default: Some(250),
        })
}

fn bathymetry_config() -> ServiceConfig {
    ServiceConfig::new("S102", "S-102 High Resolution Bathymetry")
        .with_formats(&["image/png"])
        .with_wcs(WcsOptions {
            supported_coverage_formats: vec!["GeoTIFF".into(), "NetCDF".into()],
            default_coverage_format: Some("NetCDF".into()),
            supported_interpolations: vec!["nearest".into(), "bilinear".into()],
            default_interpolation: Some("bilinear".into()),
        })
}

// ============================================================================
// WMS
// ============================================================================

#[test]
fn test_wms_defaults_from_config() {
    let query = RawQuery::from_pairs([("REQUEST", "GetMap"), ("BBOX", "120,30,122,32")]);
    let params = RequestParameters::extract(ServiceType::Wms, &query, &chart_config());

    assert_eq!(params.request.as_deref(), Some("GetMap"));
    assert_eq!(params.format.as_deref(), Some("image/svg+xml"));
    assert_eq!(params.crs.as_deref(), Some("EPSG:4326"));
    let wms = params.wms().unwrap();
    assert_eq!(wms.styles, "default");
    assert!(!wms.transparent);
}

#[test]
fn test_wms_layers_select_dataset() {
    let query = RawQuery::from_pairs([("layers", "Yangtze Approach"), ("srs", "EPSG:3857")]);
    let params = RequestParameters::extract(ServiceType::Wms, &query, &chart_config());
    assert_eq!(params.dataset.as_deref(), Some("Yangtze Approach"));
    assert_eq!(params.crs.as_deref(), Some("EPSG:3857"));
}

#[test]
fn test_wms_explicit_dataset_beats_layers() {
    let query = RawQuery::from_pairs([("layers", "a"), ("dataset", "b")]);
    let params = RequestParameters::extract(ServiceType::Wms, &query, &chart_config());
    assert_eq!(params.dataset.as_deref(), Some("b"));
    assert_eq!(params.wms().unwrap().layers.as_deref(), Some("a"));
}

#[test]
fn test_dataset_id_is_common_to_all_protocols() {
    let query = RawQuery::from_pairs([("DATASETID", "ds-42")]);
    for service_type in ServiceType::ALL {
        let params = RequestParameters::extract(service_type, &query, &chart_config());
        assert_eq!(params.dataset_id.as_deref(), Some("ds-42"));
        assert_eq!(params.value("datasetId"), Some("ds-42"));
    }
}

#[test]
fn test_wms_transparent_flag() {
    let mut config = chart_config();
    config.transparent_default = true;

    let params = RequestParameters::extract(ServiceType::Wms, &RawQuery::default(), &config);
    assert!(params.wms().unwrap().transparent);

    let query = RawQuery::from_pairs([("TRANSPARENT", "false")]);
    let params = RequestParameters::extract(ServiceType::Wms, &query, &config);
    assert!(!params.wms().unwrap().transparent);

    let query = RawQuery::from_pairs([("transparent", "maybe")]);
    let params = RequestParameters::extract(ServiceType::Wms, &query, &config);
    assert!(params.wms().unwrap().transparent);
}

// ============================================================================
// WFS
// ============================================================================

#[test]
fn test_wfs_defaults() {
    let params = RequestParameters::extract(ServiceType::Wfs, &RawQuery::default(), &chart_config());
    let wfs = params.wfs().unwrap();
    assert_eq!(wfs.max_features().unwrap(), 250);
    assert_eq!(wfs.output_format, "GeoJSON");
    assert!(params.format.is_none());
}

#[test]
fn test_wfs_without_options_uses_builtin_defaults() {
    let config = ServiceConfig::new("S124", "S-124 Navigational Warnings");
    let params = RequestParameters::extract(ServiceType::Wfs, &RawQuery::default(), &config);
    let wfs = params.wfs().unwrap();
    assert_eq!(wfs.max_features().unwrap(), 1000);
    assert_eq!(wfs.output_format, "GeoJSON");
}

#[test]
fn test_wfs_count_alias_and_bad_value() {
    let query = RawQuery::from_pairs([("count", "5"), ("typeNames", "DEPARE")]);
    let params = RequestParameters::extract(ServiceType::Wfs, &query, &chart_config());
    assert_eq!(params.wfs().unwrap().max_features().unwrap(), 5);
    assert_eq!(params.value("typeName"), Some("DEPARE"));

    let query = RawQuery::from_pairs([("maxFeatures", "lots")]);
    let params = RequestParameters::extract(ServiceType::Wfs, &query, &chart_config());
    assert!(matches!(
        params.wfs().unwrap().max_features(),
        Err(OgcError::InvalidParameter { .. })
    ));
}

// ============================================================================
// WCS
// ============================================================================

#[test]
fn test_wcs_defaults_and_aliases() {
    let query = RawQuery::from_pairs([("coverage", "depth"), ("time", "2024-05-01T00:00:00Z")]);
    let params = RequestParameters::extract(ServiceType::Wcs, &query, &bathymetry_config());
    let wcs = params.wcs().unwrap();
    assert_eq!(wcs.coverage_id.as_deref(), Some("depth"));
    assert_eq!(wcs.interpolation, "bilinear");
    assert_eq!(params.format.as_deref(), Some("NetCDF"));
    assert_eq!(params.value("time"), Some("2024-05-01T00:00:00Z"));
}

#[test]
fn test_wcs_format_falls_back_to_geotiff() {
    let config = ServiceConfig::new("S102", "bathymetry");
    let params = RequestParameters::extract(ServiceType::Wcs, &RawQuery::default(), &config);
    assert_eq!(params.format.as_deref(), Some("GeoTIFF"));
    assert_eq!(params.wcs().unwrap().interpolation, "nearest");
}

// ============================================================================
// Validation helpers
// ============================================================================

#[test]
fn test_missing_reports_whole_set_in_order() {
    let query = RawQuery::from_pairs([("width", "400"), ("height", "")]);
    let params = RequestParameters::extract(ServiceType::Wcs, &query, &bathymetry_config());
    let err = params
        .require(&["coverageId", "bbox", "width", "height"])
        .unwrap_err();
    assert_eq!(
        err,
        OgcError::MissingRequiredParameters(vec![
            "coverageId".to_string(),
            "bbox".to_string(),
            "height".to_string()
        ])
    );
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_extension_values_visible_through_value() {
    let query = RawQuery::from_pairs([("safetyContour", "12")]);
    let mut params = RequestParameters::extract(ServiceType::Wms, &query, &chart_config());
    params.extensions.copy_from(&query, &["safetyContour", "deepContour"]);
    assert_eq!(params.value("safetyContour"), Some("12"));
    assert_eq!(params.extensions.len(), 1);
    assert_eq!(params.extensions.parse::<f64>("safetyContour").unwrap(), Some(12.0));
}

#[test]
fn test_bounding_box_and_dimensions() {
    let query = RawQuery::from_pairs([("bbox", "120,30,122,32"), ("width", "400"), ("height", "300")]);
    let params = RequestParameters::extract(ServiceType::Wms, &query, &chart_config());
    let bbox = params.bounding_box().unwrap().unwrap();
    assert_eq!(bbox.width(), 2.0);
    assert_eq!(params.dimensions().unwrap(), (400, 300));

    let query = RawQuery::from_pairs([("bbox", "nope")]);
    let params = RequestParameters::extract(ServiceType::Wms, &query, &chart_config());
    let err = params.bounding_box().unwrap_err();
    assert_eq!(err.status_code(), 400);
}
