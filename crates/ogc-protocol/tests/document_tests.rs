//! Capabilities, GML and coverage documents: content and well-formedness.

use ogc_common::{BoundingBox, Feature, FeatureCollection, Geometry, ServiceType};
use ogc_protocol::{
    CapabilitiesDocument, Capability, CoverageDescription, CoverageSummary, GmlEncoder,
    ProviderInfo, ServiceConfig, WcsOptions, WfsOptions,
};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Parse the whole document, returning how many start/empty elements are named `name`.
fn count_elements(xml: &str, name: &str) -> usize {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut count = 0;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == name.as_bytes() {
                    count += 1;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("malformed XML at {}: {:?}", reader.buffer_position(), e),
            _ => {}
        }
    }
    count
}

fn full_config() -> ServiceConfig {
    ServiceConfig::new("S102", "S-102 High Resolution Bathymetry")
        .with_description("Bathymetric surface & uncertainty")
        .with_formats(&["image/png", "image/jpeg"])
        .with_styles(&["default", "contours", "shaded_relief"])
        .with_capability(Capability::new(ServiceType::Wms, "S-102 WMS", "/api/s102/wms"))
        .with_capability(
            Capability::new(ServiceType::Wcs, "S-102 WCS", "/api/s102/wcs")
                .with_optional_parameters(&["resolution", "verticalDatum"]),
        )
        .with_capability(Capability::new(ServiceType::Wfs, "S-102 WFS", "/api/s102/wfs"))
        .with_wcs(WcsOptions {
            supported_coverage_formats: vec!["GeoTIFF".into(), "NetCDF".into()],
            default_coverage_format: Some("GeoTIFF".into()),
            supported_interpolations: vec!["nearest".into(), "bilinear".into()],
            default_interpolation: None,
        })
        .with_wfs(WfsOptions {
            supported_output_formats: vec!["GeoJSON".into(), "GML".into()],
            default_output_format: None,
            max_features_default: None,
        })
}

fn render(config: &ServiceConfig, service: ServiceType, base_url: &str) -> String {
    let provider = ProviderInfo::default();
    let capability = config.capability(service).unwrap();
    CapabilitiesDocument::new(base_url, capability, config, &provider).render()
}

// ============================================================================
// Capabilities
// ============================================================================

#[test]
fn test_wms_capabilities_content() {
    let config = full_config();
    let xml = render(&config, ServiceType::Wms, "https://portal.example");

    assert!(xml.contains("S-102 High Resolution Bathymetry"));
    assert!(xml.contains("Bathymetric surface &amp; uncertainty"));
    assert!(xml.contains(r#"xlink:href="https://portal.example/api/s102/wms""#));
    assert!(xml.contains("<ows:ServiceType>OGC WMS</ows:ServiceType>"));
    assert!(xml.contains("<ows:ProviderName>S-100 Maritime Services</ows:ProviderName>"));
    assert_eq!(count_elements(&xml, "Style"), 3);
    assert!(xml.contains(r#"xlink:href="https://portal.example/api/s102/wms/legend/shaded_relief.png""#));
    assert!(xml.contains(r#"<LegendURL width="200" height="50">"#));
    assert_eq!(count_elements(&xml, "ows:Operation"), 2);
}

#[test]
fn test_wcs_capabilities_lists_coverage_formats() {
    let config = full_config();
    let xml = render(&config, ServiceType::Wcs, "https://portal.example/");

    assert!(xml.contains(r#"xlink:href="https://portal.example/api/s102/wcs""#));
    assert_eq!(count_elements(&xml, "CoverageFormats"), 1);
    assert!(xml.contains("<Format>NetCDF</Format>"));
    assert!(xml.contains("<InterpolationMethod>bilinear</InterpolationMethod>"));
    assert!(xml.contains("<ows:Value>verticalDatum</ows:Value>"));
    assert_eq!(count_elements(&xml, "Style"), 0);
    assert_eq!(count_elements(&xml, "ows:Operation"), 3);
}

#[test]
fn test_wfs_capabilities_lists_output_formats() {
    let config = full_config();
    let xml = render(&config, ServiceType::Wfs, "http://localhost:8080");
    assert_eq!(count_elements(&xml, "OutputFormats"), 1);
    assert!(xml.contains("<ows:Operation name=\"GetFeature\">"));
}

#[test]
fn test_capabilities_are_deterministic() {
    let config = full_config();
    for service in ServiceType::ALL {
        let first = render(&config, service, "https://portal.example");
        let second = render(&config, service, "https://portal.example");
        assert_eq!(first, second);
    }
}

// ============================================================================
// GML
// ============================================================================

#[test]
fn test_gml_two_points_yield_two_gml_points() {
    let collection = FeatureCollection::new().with_features(vec![
        Feature::point(121.1, 31.1).with_property("name", "Light A"),
        Feature::point(121.2, 31.3).with_property("name", "Light B"),
    ]);
    let xml = GmlEncoder::new("S101").encode(&collection);

    assert_eq!(count_elements(&xml, "gml:Point"), 2);
    assert_eq!(count_elements(&xml, "gml:pos"), 2);
    assert_eq!(count_elements(&xml, "s101:name"), 2);
    assert!(xml.contains(r#"xmlns:s101="http://www.iho.int/s100/s101""#));
    assert!(xml.contains(r#"numberReturned="2""#));
}

#[test]
fn test_gml_mixed_geometries() {
    let bbox = BoundingBox::new(121.0, 31.0, 121.5, 31.5);
    let collection = FeatureCollection::new().with_features(vec![
        Feature::new(Some(Geometry::rectangle(&bbox))).with_id("area-1"),
        Feature::new(None),
    ]);
    let xml = GmlEncoder::new("S101").encode(&collection);
    assert_eq!(count_elements(&xml, "gml:Polygon"), 1);
    assert_eq!(count_elements(&xml, "gml:Null"), 1);
    assert!(xml.contains(r#"gml:id="s101.2""#));
}

// ============================================================================
// DescribeCoverage
// ============================================================================

#[test]
fn test_coverage_description() {
    let config = full_config();
    let coverages = vec![CoverageSummary {
        id: "9f0c-bathy".to_string(),
        title: "Yangtze <estuary>".to_string(),
        envelope: BoundingBox::new(121.0, 31.0, 122.0, 32.0),
        grid_width: 400,
        grid_height: 300,
    }];

    let xml = CoverageDescription::new(&config, &coverages).render();
    assert_eq!(count_elements(&xml, "wcs:CoverageDescription"), 1);
    assert!(xml.contains("<gml:high>399 299</gml:high>"));
    assert!(xml.contains("<gml:lowerCorner>121 31</gml:lowerCorner>"));
    assert!(xml.contains("<wcs:nativeFormat>GeoTIFF</wcs:nativeFormat>"));
    assert!(xml.contains(r#"gml:id="_9f0c-bathy""#));
    assert_eq!(count_elements(&xml, "TemporalDomain"), 0);

    let timed = CoverageDescription::new(&config, &coverages)
        .with_time(Some("2024-05-01T00:00:00Z"))
        .render();
    assert_eq!(count_elements(&timed, "TemporalDomain"), 1);
    assert!(timed.contains("<gml:timePosition>2024-05-01T00:00:00Z</gml:timePosition>"));
}
