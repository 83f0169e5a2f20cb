//! OGC protocol families.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The protocol a capability is served over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    Wms,
    Wfs,
    Wcs,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [ServiceType::Wms, ServiceType::Wfs, ServiceType::Wcs];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Wms => "WMS",
            ServiceType::Wfs => "WFS",
            ServiceType::Wcs => "WCS",
        }
    }

    /// Protocol version advertised in capabilities documents.
    pub fn default_version(&self) -> &'static str {
        match self {
            ServiceType::Wms => "1.3.0",
            ServiceType::Wfs => "2.0.0",
            ServiceType::Wcs => "2.0.1",
        }
    }

    /// Request verbs, other than GetCapabilities, this protocol answers.
    pub fn data_operations(&self) -> &'static [&'static str] {
        match self {
            ServiceType::Wms => &["GetMap"],
            ServiceType::Wfs => &["GetFeature"],
            ServiceType::Wcs => &["DescribeCoverage", "GetCoverage"],
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WMS" => Ok(ServiceType::Wms),
            "WFS" => Ok(ServiceType::Wfs),
            "WCS" => Ok(ServiceType::Wcs),
            other => Err(format!("unknown service type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("wms".parse::<ServiceType>().unwrap(), ServiceType::Wms);
        assert_eq!("Wfs".parse::<ServiceType>().unwrap(), ServiceType::Wfs);
        assert_eq!("WCS".parse::<ServiceType>().unwrap(), ServiceType::Wcs);
        assert!("wmts".parse::<ServiceType>().is_err());
    }

    #[test]
    fn serializes_upper_case() {
        let json = serde_json::to_string(&ServiceType::Wcs).unwrap();
        assert_eq!(json, "\"WCS\"");
    }
}
