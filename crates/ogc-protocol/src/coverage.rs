//! WCS 2.0 DescribeCoverage documents.

use ogc_common::BoundingBox;

use crate::config::ServiceConfig;
use crate::xml::{element_name, escape};

/// One coverage to describe, typically one matched dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageSummary {
    pub id: String,
    pub title: String,
    pub envelope: BoundingBox,
    pub grid_width: u32,
    pub grid_height: u32,
}

pub struct CoverageDescription<'a> {
    config: &'a ServiceConfig,
    crs: &'a str,
    time: Option<&'a str>,
    coverages: &'a [CoverageSummary],
}

impl<'a> CoverageDescription<'a> {
    pub fn new(config: &'a ServiceConfig, coverages: &'a [CoverageSummary]) -> Self {
        Self {
            config,
            crs: config.default_crs(),
            time: None,
            coverages,
        }
    }

    pub fn with_crs(mut self, crs: &'a str) -> Self {
        self.crs = crs;
        self
    }

    /// Adds a temporal domain to every description.
    pub fn with_time(mut self, time: Option<&'a str>) -> Self {
        self.time = time;
        self
    }

    pub fn render(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<wcs:CoverageDescriptions xmlns:wcs="http://www.opengis.net/wcs/2.0"
    xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:gmlcov="http://www.opengis.net/gmlcov/1.0">
"#,
        );
        for coverage in self.coverages {
            self.push_coverage(&mut xml, coverage);
        }
        xml.push_str("</wcs:CoverageDescriptions>\n");
        xml
    }

    fn push_coverage(&self, xml: &mut String, coverage: &CoverageSummary) {
        let gml_id = escape(&element_name(&coverage.id)).into_owned();
        let env = &coverage.envelope;

        xml.push_str(&format!(
            r#"  <wcs:CoverageDescription gml:id="{gml_id}">
    <gml:description>{title}</gml:description>
    <gml:boundedBy>
      <gml:Envelope srsName="{crs}" axisLabels="Long Lat" uomLabels="deg deg" srsDimension="2">
        <gml:lowerCorner>{min_x} {min_y}</gml:lowerCorner>
        <gml:upperCorner>{max_x} {max_y}</gml:upperCorner>
      </gml:Envelope>
    </gml:boundedBy>
    <wcs:CoverageId>{id}</wcs:CoverageId>
    <gml:domainSet>
      <gml:RectifiedGrid gml:id="grid-{gml_id}" dimension="2">
        <gml:limits>
          <gml:GridEnvelope>
            <gml:low>0 0</gml:low>
            <gml:high>{hi_x} {hi_y}</gml:high>
          </gml:GridEnvelope>
        </gml:limits>
        <gml:axisLabels>i j</gml:axisLabels>
      </gml:RectifiedGrid>
    </gml:domainSet>
"#,
            gml_id = gml_id,
            title = escape(&coverage.title),
            crs = escape(self.crs),
            min_x = env.min_x,
            min_y = env.min_y,
            max_x = env.max_x,
            max_y = env.max_y,
            id = escape(&coverage.id),
            hi_x = coverage.grid_width.saturating_sub(1),
            hi_y = coverage.grid_height.saturating_sub(1),
        ));

        if let Some(time) = self.time {
            xml.push_str(&format!(
                r#"    <gmlcov:metadata>
      <TemporalDomain>
        <gml:TimeInstant gml:id="time-{gml_id}">
          <gml:timePosition>{}</gml:timePosition>
        </gml:TimeInstant>
      </TemporalDomain>
    </gmlcov:metadata>
"#,
                escape(time)
            ));
        }

        xml.push_str("    <wcs:ServiceParameters>\n");
        xml.push_str("      <wcs:CoverageSubtype>RectifiedGridCoverage</wcs:CoverageSubtype>\n");
        if let Some(wcs) = &self.config.wcs {
            if let Some(native) = wcs
                .default_coverage_format
                .as_ref()
                .or_else(|| wcs.supported_coverage_formats.first())
            {
                xml.push_str(&format!(
                    "      <wcs:nativeFormat>{}</wcs:nativeFormat>\n",
                    escape(native)
                ));
            }
            xml.push_str("      <SupportedFormats>\n");
            for f in &wcs.supported_coverage_formats {
                xml.push_str(&format!("        <Format>{}</Format>\n", escape(f)));
            }
            xml.push_str("      </SupportedFormats>\n");
        }
        xml.push_str("      <SupportedCRS>\n");
        for crs in &self.config.supported_crs {
            xml.push_str(&format!("        <CRS>{}</CRS>\n", escape(crs)));
        }
        xml.push_str("      </SupportedCRS>\n");
        xml.push_str("    </wcs:ServiceParameters>\n");
        xml.push_str("  </wcs:CoverageDescription>\n");
    }
}
