//! GeoJSON to GML 3.2 conversion for WFS responses.
//!
//! Each product gets a fixed namespace derived from its code:
//! `S101` → prefix `s101`, URI `http://www.iho.int/s100/s101`.
//! Polygons keep only their exterior ring.

use ogc_common::{Feature, FeatureCollection, Geometry, Position};
use serde_json::Value;

use crate::xml::{element_name, escape};

pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";
pub const WFS_NAMESPACE: &str = "http://www.opengis.net/wfs/2.0";

#[derive(Debug, Clone)]
pub struct GmlEncoder {
    prefix: String,
    namespace: String,
    srs_name: String,
}

impl GmlEncoder {
    pub fn new(product_code: &str) -> Self {
        let prefix = element_name(&product_code.to_ascii_lowercase());
        Self {
            namespace: format!("http://www.iho.int/s100/{}", prefix),
            prefix,
            srs_name: "EPSG:4326".to_string(),
        }
    }

    pub fn with_srs_name(mut self, srs_name: impl Into<String>) -> Self {
        self.srs_name = srs_name.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn encode(&self, collection: &FeatureCollection) -> String {
        let count = collection.features.len();
        let mut xml = String::with_capacity(256 + count * 512);
        xml.push_str(&format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:FeatureCollection xmlns:wfs="{wfs}" xmlns:gml="{gml}" xmlns:{prefix}="{ns}" numberMatched="{count}" numberReturned="{count}">
"#,
            wfs = WFS_NAMESPACE,
            gml = GML_NAMESPACE,
            prefix = self.prefix,
            ns = escape(&self.namespace),
            count = count,
        ));
        for (index, feature) in collection.features.iter().enumerate() {
            self.push_feature(&mut xml, index, feature);
        }
        xml.push_str("</wfs:FeatureCollection>\n");
        xml
    }

    fn push_feature(&self, xml: &mut String, index: usize, feature: &Feature) {
        let p = &self.prefix;
        let id = match &feature.id {
            Some(id) => element_name(&id.to_string()),
            None => format!("{}.{}", p, index + 1),
        };

        xml.push_str("  <wfs:member>\n");
        xml.push_str(&format!("    <{p}:Feature gml:id=\"{}\">\n", escape(&id)));
        xml.push_str(&format!("      <{p}:geometry>\n"));
        xml.push_str("        ");
        xml.push_str(&self.geometry(feature.geometry.as_ref()));
        xml.push('\n');
        xml.push_str(&format!("      </{p}:geometry>\n"));

        for (key, value) in &feature.properties {
            let Some(text) = property_text(value) else {
                continue;
            };
            let name = element_name(key);
            xml.push_str(&format!(
                "      <{p}:{name}>{}</{p}:{name}>\n",
                escape(&text)
            ));
        }

        xml.push_str(&format!("    </{p}:Feature>\n"));
        xml.push_str("  </wfs:member>\n");
    }

    /// GML fragment for a geometry. Unsupported or absent geometries become `<gml:Null/>`.
    pub fn geometry(&self, geometry: Option<&Geometry>) -> String {
        let srs = escape(&self.srs_name);
        match geometry {
            Some(Geometry::Point { coordinates }) => format!(
                "<gml:Point srsName=\"{srs}\"><gml:pos>{}</gml:pos></gml:Point>",
                join_position(coordinates)
            ),
            Some(Geometry::LineString { coordinates }) if !coordinates.is_empty() => format!(
                "<gml:LineString srsName=\"{srs}\"><gml:posList srsDimension=\"{}\">{}</gml:posList></gml:LineString>",
                dimension(coordinates),
                join_positions(coordinates)
            ),
            Some(Geometry::Polygon { coordinates }) if !coordinates.is_empty() && !coordinates[0].is_empty() => {
                let exterior = &coordinates[0];
                format!(
                    "<gml:Polygon srsName=\"{srs}\"><gml:exterior><gml:LinearRing><gml:posList srsDimension=\"{}\">{}</gml:posList></gml:LinearRing></gml:exterior></gml:Polygon>",
                    dimension(exterior),
                    join_positions(exterior)
                )
            }
            _ => "<gml:Null/>".to_string(),
        }
    }
}

fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn dimension(positions: &[Position]) -> usize {
    positions.first().map(Vec::len).unwrap_or(2)
}

fn join_position(position: &[f64]) -> String {
    position
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_positions(positions: &[Position]) -> String {
    positions
        .iter()
        .map(|p| join_position(p))
        .collect::<Vec<_>>()
        .join(" ")
}
