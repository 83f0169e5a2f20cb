//! Dataset records as exposed to the services.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ogc_common::{BoundingBox, Feature, Geometry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Publication lifecycle of a dataset. Only `Published` datasets are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatasetStatus {
    Draft,
    Uploaded,
    Processing,
    Published,
    Error,
    Deprecated,
    Archived,
}

impl DatasetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetStatus::Draft => "DRAFT",
            DatasetStatus::Uploaded => "UPLOADED",
            DatasetStatus::Processing => "PROCESSING",
            DatasetStatus::Published => "PUBLISHED",
            DatasetStatus::Error => "ERROR",
            DatasetStatus::Deprecated => "DEPRECATED",
            DatasetStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(DatasetStatus::Draft),
            "UPLOADED" => Ok(DatasetStatus::Uploaded),
            "PROCESSING" => Ok(DatasetStatus::Processing),
            "PUBLISHED" => Ok(DatasetStatus::Published),
            "ERROR" => Ok(DatasetStatus::Error),
            "DEPRECATED" => Ok(DatasetStatus::Deprecated),
            "ARCHIVED" => Ok(DatasetStatus::Archived),
            other => Err(format!("unknown dataset status: {}", other)),
        }
    }
}

/// The node (port, regional office) a dataset originates from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Product code, e.g. `S101`.
    pub product_type: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub status: DatasetStatus,
    /// Raw GeoJSON: a FeatureCollection, a Feature or a bare geometry.
    #[serde(default)]
    pub coverage: Option<String>,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    pub node: NodeRef,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl DatasetRecord {
    pub fn is_published(&self) -> bool {
        self.status == DatasetStatus::Published
    }

    /// Features carried by the coverage payload.
    ///
    /// Returns an empty list when there is no payload or it holds no features.
    pub fn coverage_features(&self) -> Result<Vec<Feature>, serde_json::Error> {
        let Some(raw) = self.coverage.as_deref() else {
            return Ok(Vec::new());
        };
        let value: Value = serde_json::from_str(raw)?;
        match value.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {
                let features = value.get("features").cloned().unwrap_or(Value::Array(Vec::new()));
                serde_json::from_value(features)
            }
            Some("Feature") => Ok(vec![serde_json::from_value(value)?]),
            Some(_) => {
                let geometry: Geometry = serde_json::from_value(value)?;
                Ok(vec![Feature::new(Some(geometry))])
            }
            None => Ok(Vec::new()),
        }
    }

    /// Recorded extent, else the envelope of the coverage payload.
    pub fn extent(&self) -> Option<BoundingBox> {
        if self.bbox.is_some() {
            return self.bbox;
        }
        let features = self.coverage_features().ok()?;
        let positions: Vec<&[f64]> = features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .flat_map(|g| g.positions())
            .collect();
        BoundingBox::from_positions(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(coverage: Option<&str>) -> DatasetRecord {
        DatasetRecord {
            id: "ds-1".into(),
            name: "Shanghai Port ENC".into(),
            description: None,
            product_type: "S101".into(),
            version: "1.0.0".into(),
            status: DatasetStatus::Published,
            coverage: coverage.map(str::to_string),
            bbox: None,
            node: NodeRef {
                id: "node-sh".into(),
                name: "Shanghai Port".into(),
                latitude: Some(31.23),
                longitude: Some(121.47),
            },
            published_at: None,
        }
    }

    #[test]
    fn bare_polygon_coverage_becomes_one_feature() {
        let r = record(Some(
            r#"{"type":"Polygon","coordinates":[[[121.0,31.0],[121.5,31.0],[121.5,31.5],[121.0,31.5],[121.0,31.0]]]}"#,
        ));
        let features = r.coverage_features().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(r.extent(), Some(BoundingBox::new(121.0, 31.0, 121.5, 31.5)));
    }

    #[test]
    fn feature_collection_coverage() {
        let r = record(Some(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[121.1,31.1]},"properties":{}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[121.3,31.2]},"properties":{}}]}"#,
        ));
        assert_eq!(r.coverage_features().unwrap().len(), 2);
    }

    #[test]
    fn missing_and_broken_coverage() {
        assert!(record(None).coverage_features().unwrap().is_empty());
        assert!(record(None).extent().is_none());
        assert!(record(Some("{not json")).coverage_features().is_err());
    }

    #[test]
    fn status_round_trip() {
        assert_eq!("published".parse::<DatasetStatus>().unwrap(), DatasetStatus::Published);
        assert_eq!(DatasetStatus::Archived.to_string(), "ARCHIVED");
        assert!("deleted".parse::<DatasetStatus>().is_err());
    }
}
