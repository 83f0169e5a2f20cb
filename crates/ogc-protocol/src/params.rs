//! Query parameter extraction.
//!
//! `RawQuery` holds the inbound key/value pairs with case-insensitive names;
//! `RequestParameters::extract` turns it into the typed per-protocol bag with
//! configuration defaults applied. Nothing here fails: validation belongs to
//! the protocol handlers.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use ogc_common::{BoundingBox, OgcError, OgcResult, ServiceType};
use serde::Serialize;

use crate::config::ServiceConfig;

/// Largest width/height accepted for generated payloads.
pub const MAX_DIMENSION: u32 = 8192;

/// Fallback for `maxFeatures` when neither request nor config supplies one.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Inbound query parameters keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQuery {
    values: HashMap<String, String>,
}

impl RawQuery {
    /// Build from key/value pairs. The first occurrence of a name wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values = HashMap::new();
        for (k, v) in pairs {
            values
                .entry(k.as_ref().to_ascii_lowercase())
                .or_insert_with(|| v.into());
        }
        Self { values }
    }

    /// Value of `name`, ignoring case. Blank values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First present value among `names`.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|n| self.get(n))
    }

    fn owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, String>> for RawQuery {
    fn from(map: HashMap<String, String>) -> Self {
        Self::from_pairs(map)
    }
}

/// Product-specific parameters contributed by a product's extension step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extensions(BTreeMap<String, String>);

impl Extensions {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Parse an extension value, reporting malformed input as a 400.
    pub fn parse<T: FromStr>(&self, name: &str) -> OgcResult<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| OgcError::invalid(name, format!("cannot parse '{}'", raw))),
        }
    }

    /// Copy each named query parameter, if present, under its canonical name.
    pub fn copy_from(&mut self, query: &RawQuery, names: &[&str]) {
        for name in names {
            if let Some(value) = query.get(name) {
                self.insert(*name, value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsParameters {
    pub layers: Option<String>,
    pub styles: String,
    pub transparent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WfsParameters {
    pub type_name: Option<String>,
    /// Raw value; parsed by the handler so malformed input becomes a 400.
    pub max_features: String,
    pub output_format: String,
}

impl WfsParameters {
    pub fn max_features(&self) -> OgcResult<usize> {
        self.max_features.parse().map_err(|_| {
            OgcError::invalid(
                "maxFeatures",
                format!("expected a non-negative integer, got '{}'", self.max_features),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WcsParameters {
    pub coverage_id: Option<String>,
    pub interpolation: String,
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "protocol")]
pub enum ProtocolParameters {
    Wms(WmsParameters),
    Wfs(WfsParameters),
    Wcs(WcsParameters),
}

/// Normalized parameters of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestParameters {
    pub service: Option<String>,
    pub version: Option<String>,
    pub request: Option<String>,
    /// Dataset / layer selector used for name filtering.
    pub dataset: Option<String>,
    /// Exact dataset identifier (`datasetId`).
    pub dataset_id: Option<String>,
    pub bbox: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub format: Option<String>,
    pub crs: Option<String>,
    pub protocol: ProtocolParameters,
    pub extensions: Extensions,
}

impl RequestParameters {
    /// Extract the standard fields for `service_type`, substituting defaults.
    pub fn extract(service_type: ServiceType, query: &RawQuery, config: &ServiceConfig) -> Self {
        let crs = query
            .first_of(&["crs", "srs"])
            .map(str::to_string)
            .or_else(|| Some(config.default_crs().to_string()));

        let mut params = Self {
            service: query.owned("service"),
            version: query.owned("version"),
            request: query.owned("request"),
            dataset: query.owned("dataset"),
            dataset_id: query.owned("datasetId"),
            bbox: query.owned("bbox"),
            width: query.owned("width"),
            height: query.owned("height"),
            format: query.owned("format"),
            crs,
            protocol: ProtocolParameters::Wms(WmsParameters {
                layers: None,
                styles: String::new(),
                transparent: false,
            }),
            extensions: Extensions::default(),
        };

        params.protocol = match service_type {
            ServiceType::Wms => {
                let layers = query.owned("layers");
                if params.dataset.is_none() {
                    params.dataset = layers.clone();
                }
                if params.format.is_none() {
                    params.format = config.default_format().map(str::to_string);
                }
                let transparent = match query.get("transparent") {
                    Some(v) if v.eq_ignore_ascii_case("true") => true,
                    Some(v) if v.eq_ignore_ascii_case("false") => false,
                    _ => config.transparent_default,
                };
                ProtocolParameters::Wms(WmsParameters {
                    layers,
                    styles: query
                        .get("styles")
                        .unwrap_or_else(|| config.default_style())
                        .to_string(),
                    transparent,
                })
            }
            ServiceType::Wfs => {
                let wfs = config.wfs.as_ref();
                let max_features = query
                    .first_of(&["maxFeatures", "count"])
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        wfs.and_then(|o| o.max_features_default)
                            .unwrap_or(DEFAULT_MAX_FEATURES)
                            .to_string()
                    });
                let output_format = query
                    .get("outputFormat")
                    .map(str::to_string)
                    .or_else(|| wfs.and_then(|o| o.default_output_format.clone()))
                    .unwrap_or_else(|| "GeoJSON".to_string());
                ProtocolParameters::Wfs(WfsParameters {
                    type_name: query.first_of(&["typeName", "typeNames"]).map(str::to_string),
                    max_features,
                    output_format,
                })
            }
            ServiceType::Wcs => {
                let wcs = config.wcs.as_ref();
                if params.format.is_none() {
                    params.format = Some(
                        wcs.and_then(|o| o.default_coverage_format.clone())
                            .unwrap_or_else(|| "GeoTIFF".to_string()),
                    );
                }
                let interpolation = query
                    .get("interpolation")
                    .map(str::to_string)
                    .or_else(|| wcs.and_then(|o| o.default_interpolation.clone()))
                    .unwrap_or_else(|| "nearest".to_string());
                ProtocolParameters::Wcs(WcsParameters {
                    coverage_id: query.first_of(&["coverageId", "coverage"]).map(str::to_string),
                    interpolation,
                    time: query.owned("time"),
                })
            }
        };

        params
    }

    pub fn service_type(&self) -> ServiceType {
        match self.protocol {
            ProtocolParameters::Wms(_) => ServiceType::Wms,
            ProtocolParameters::Wfs(_) => ServiceType::Wfs,
            ProtocolParameters::Wcs(_) => ServiceType::Wcs,
        }
    }

    pub fn wms(&self) -> Option<&WmsParameters> {
        match &self.protocol {
            ProtocolParameters::Wms(p) => Some(p),
            _ => None,
        }
    }

    pub fn wfs(&self) -> Option<&WfsParameters> {
        match &self.protocol {
            ProtocolParameters::Wfs(p) => Some(p),
            _ => None,
        }
    }

    pub fn wcs(&self) -> Option<&WcsParameters> {
        match &self.protocol {
            ProtocolParameters::Wcs(p) => Some(p),
            _ => None,
        }
    }

    /// Value of a standard field by its OGC name, falling back to extensions.
    pub fn value(&self, name: &str) -> Option<&str> {
        let standard = match name.to_ascii_lowercase().as_str() {
            "service" => self.service.as_deref(),
            "version" => self.version.as_deref(),
            "request" => self.request.as_deref(),
            "dataset" => self.dataset.as_deref(),
            "datasetid" => self.dataset_id.as_deref(),
            "bbox" => self.bbox.as_deref(),
            "width" => self.width.as_deref(),
            "height" => self.height.as_deref(),
            "format" => self.format.as_deref(),
            "crs" => self.crs.as_deref(),
            "layers" => self.wms().and_then(|p| p.layers.as_deref()),
            "styles" => self.wms().map(|p| p.styles.as_str()),
            "typename" => self.wfs().and_then(|p| p.type_name.as_deref()),
            "maxfeatures" => self.wfs().map(|p| p.max_features.as_str()),
            "outputformat" => self.wfs().map(|p| p.output_format.as_str()),
            "coverageid" => self.wcs().and_then(|p| p.coverage_id.as_deref()),
            "interpolation" => self.wcs().map(|p| p.interpolation.as_str()),
            "time" => self.wcs().and_then(|p| p.time.as_deref()),
            _ => None,
        };
        standard
            .or_else(|| self.extensions.get(name))
            .filter(|v| !v.trim().is_empty())
    }

    /// Names in `required` with no non-empty value, in the given order.
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.value(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    /// Fail with the full missing set if any of `required` is absent.
    pub fn require(&self, required: &[&str]) -> OgcResult<()> {
        let missing = self.missing(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(OgcError::MissingRequiredParameters(missing))
        }
    }

    /// Parsed `bbox`, if supplied.
    pub fn bounding_box(&self) -> OgcResult<Option<BoundingBox>> {
        self.bbox
            .as_deref()
            .map(|raw| {
                BoundingBox::from_ogc_string(raw).map_err(|e| OgcError::invalid("bbox", e.to_string()))
            })
            .transpose()
    }

    /// Parsed `(width, height)`, each within `1..=MAX_DIMENSION`.
    pub fn dimensions(&self) -> OgcResult<(u32, u32)> {
        Ok((
            parse_dimension("width", self.width.as_deref())?,
            parse_dimension("height", self.height.as_deref())?,
        ))
    }
}

fn parse_dimension(name: &str, raw: Option<&str>) -> OgcResult<u32> {
    let raw = raw.ok_or_else(|| OgcError::MissingRequiredParameters(vec![name.to_string()]))?;
    match raw.parse::<u32>() {
        Ok(v) if (1..=MAX_DIMENSION).contains(&v) => Ok(v),
        _ => Err(OgcError::invalid(
            name,
            format!("expected an integer between 1 and {}, got '{}'", MAX_DIMENSION, raw),
        )),
    }
}
