//! Capabilities document generation.
//!
//! Rendering is a pure function of the base URL, the matched capability, the
//! product configuration and the provider block, so identical inputs always
//! yield byte-identical documents and front-end proxies may cache them.

use ogc_common::ServiceType;

use crate::config::{Capability, ProviderInfo, ServiceConfig};
use crate::xml::escape;

/// Legend image size advertised for every WMS style.
pub const LEGEND_WIDTH: u32 = 200;
pub const LEGEND_HEIGHT: u32 = 50;

pub struct CapabilitiesDocument<'a> {
    base_url: &'a str,
    capability: &'a Capability,
    config: &'a ServiceConfig,
    provider: &'a ProviderInfo,
}

impl<'a> CapabilitiesDocument<'a> {
    pub fn new(
        base_url: &'a str,
        capability: &'a Capability,
        config: &'a ServiceConfig,
        provider: &'a ProviderInfo,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/'),
            capability,
            config,
            provider,
        }
    }

    pub fn render(&self) -> String {
        let service = self.capability.service_type;
        let mut xml = String::with_capacity(4096);

        xml.push_str(&format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="{ns}"
    xmlns:ows="http://www.opengis.net/ows/1.1"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    service="{service}" version="{version}">
"#,
            ns = namespace(service),
            service = service,
            version = service.default_version(),
        ));

        self.push_identification(&mut xml);
        self.push_provider(&mut xml);
        self.push_operations(&mut xml);
        self.push_contents(&mut xml);

        xml.push_str("</Capabilities>\n");
        xml
    }

    fn push_identification(&self, xml: &mut String) {
        let service = self.capability.service_type;
        xml.push_str(&format!(
            r#"  <ows:ServiceIdentification>
    <ows:Title>{}</ows:Title>
    <ows:Abstract>{}</ows:Abstract>
    <ows:ServiceType>OGC {}</ows:ServiceType>
    <ows:ServiceTypeVersion>{}</ows:ServiceTypeVersion>
  </ows:ServiceIdentification>
"#,
            escape(&self.config.service_name),
            escape(&self.config.service_description),
            service,
            service.default_version(),
        ));
    }

    fn push_provider(&self, xml: &mut String) {
        let p = self.provider;
        xml.push_str(&format!(
            r#"  <ows:ServiceProvider>
    <ows:ProviderName>{}</ows:ProviderName>
    <ows:ProviderSite xlink:href="{}"/>
    <ows:ServiceContact>
      <ows:IndividualName>{}</ows:IndividualName>
      <ows:PositionName>{}</ows:PositionName>
      <ows:ContactInfo>
        <ows:Phone>
          <ows:Voice>{}</ows:Voice>
        </ows:Phone>
        <ows:Address>
          <ows:City>{}</ows:City>
          <ows:Country>{}</ows:Country>
          <ows:ElectronicMailAddress>{}</ows:ElectronicMailAddress>
        </ows:Address>
      </ows:ContactInfo>
    </ows:ServiceContact>
  </ows:ServiceProvider>
"#,
            escape(&p.name),
            escape(&p.site),
            escape(&p.contact_name),
            escape(&p.contact_position),
            escape(&p.phone),
            escape(&p.city),
            escape(&p.country),
            escape(&p.email),
        ));
    }

    fn push_operations(&self, xml: &mut String) {
        let href = format!("{}{}", self.base_url, self.capability.endpoint);
        let href = escape(&href);

        xml.push_str("  <ows:OperationsMetadata>\n");
        let operations = std::iter::once("GetCapabilities")
            .chain(self.capability.service_type.data_operations().iter().copied());
        for op in operations {
            xml.push_str(&format!(
                r#"    <ows:Operation name="{op}">
      <ows:DCP>
        <ows:HTTP>
          <ows:Get xlink:href="{href}"/>
          <ows:Post xlink:href="{href}"/>
        </ows:HTTP>
      </ows:DCP>
    </ows:Operation>
"#,
            ));
        }

        push_allowed_values(xml, "SupportedParameters", &self.capability.supported_parameters);
        push_allowed_values(xml, "OptionalParameters", &self.capability.optional_parameters);
        let (format_param, formats) = self.format_list();
        push_allowed_values(xml, format_param, formats);
        push_allowed_values(xml, "crs", &self.config.supported_crs);
        xml.push_str("  </ows:OperationsMetadata>\n");
    }

    /// Parameter name and values advertised for output format negotiation.
    fn format_list(&self) -> (&'static str, &'a [String]) {
        match self.capability.service_type {
            ServiceType::Wms => ("format", &self.config.supported_formats),
            ServiceType::Wfs => (
                "outputFormat",
                self.config
                    .wfs
                    .as_ref()
                    .map(|o| o.supported_output_formats.as_slice())
                    .unwrap_or(&[]),
            ),
            ServiceType::Wcs => (
                "format",
                self.config
                    .wcs
                    .as_ref()
                    .map(|o| o.supported_coverage_formats.as_slice())
                    .unwrap_or(&[]),
            ),
        }
    }

    fn push_contents(&self, xml: &mut String) {
        let config = self.config;
        xml.push_str("  <Contents>\n    <Layer>\n");
        xml.push_str(&format!(
            "      <ows:Identifier>{}</ows:Identifier>\n      <ows:Title>{}</ows:Title>\n      <ows:Abstract>{}</ows:Abstract>\n",
            escape(&config.service_code),
            escape(&config.service_name),
            escape(&config.service_description),
        ));
        if !self.capability.description.is_empty() {
            xml.push_str(&format!(
                "      <Endpoint name=\"{}\">{}</Endpoint>\n",
                escape(&self.capability.name),
                escape(&self.capability.description),
            ));
        }
        for crs in &config.supported_crs {
            xml.push_str(&format!("      <CRS>{}</CRS>\n", escape(crs)));
        }

        match self.capability.service_type {
            ServiceType::Wms => self.push_styles(xml),
            ServiceType::Wfs => {
                if let Some(wfs) = &config.wfs {
                    xml.push_str("      <OutputFormats>\n");
                    for f in &wfs.supported_output_formats {
                        xml.push_str(&format!("        <Format>{}</Format>\n", escape(f)));
                    }
                    xml.push_str("      </OutputFormats>\n");
                }
            }
            ServiceType::Wcs => {
                if let Some(wcs) = &config.wcs {
                    xml.push_str("      <CoverageFormats>\n");
                    for f in &wcs.supported_coverage_formats {
                        xml.push_str(&format!("        <Format>{}</Format>\n", escape(f)));
                    }
                    xml.push_str("      </CoverageFormats>\n");
                    if !wcs.supported_interpolations.is_empty() {
                        xml.push_str("      <InterpolationMethods>\n");
                        for m in &wcs.supported_interpolations {
                            xml.push_str(&format!(
                                "        <InterpolationMethod>{}</InterpolationMethod>\n",
                                escape(m)
                            ));
                        }
                        xml.push_str("      </InterpolationMethods>\n");
                    }
                }
            }
        }

        xml.push_str("    </Layer>\n  </Contents>\n");
    }

    fn push_styles(&self, xml: &mut String) {
        for style in &self.config.supported_styles {
            let name = escape(style);
            xml.push_str(&format!(
                r#"      <Style>
        <Name>{name}</Name>
        <Title>{name}</Title>
        <LegendURL width="{w}" height="{h}">
          <Format>image/png</Format>
          <OnlineResource xlink:type="simple" xlink:href="{base}{endpoint}/legend/{name}.png"/>
        </LegendURL>
      </Style>
"#,
                name = name,
                w = LEGEND_WIDTH,
                h = LEGEND_HEIGHT,
                base = escape(self.base_url),
                endpoint = escape(&self.capability.endpoint),
            ));
        }
    }
}

fn push_allowed_values(xml: &mut String, name: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    xml.push_str(&format!(
        "    <ows:Parameter name=\"{}\">\n      <ows:AllowedValues>\n",
        name
    ));
    for v in values {
        xml.push_str(&format!("        <ows:Value>{}</ows:Value>\n", escape(v)));
    }
    xml.push_str("      </ows:AllowedValues>\n    </ows:Parameter>\n");
}

fn namespace(service: ServiceType) -> &'static str {
    match service {
        ServiceType::Wms => "http://www.opengis.net/wms",
        ServiceType::Wfs => "http://www.opengis.net/wfs/2.0",
        ServiceType::Wcs => "http://www.opengis.net/wcs/2.0",
    }
}
