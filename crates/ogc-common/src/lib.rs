//! Common types shared by the maritime OGC service crates.

pub mod bbox;
pub mod error;
pub mod geometry;
pub mod service_type;

pub use bbox::{BboxParseError, BoundingBox};
pub use error::{OgcError, OgcResult};
pub use geometry::{Feature, FeatureCollection, Geometry, Position};
pub use service_type::ServiceType;
