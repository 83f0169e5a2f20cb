//! Dataset selection criteria.

use ogc_common::BoundingBox;

use crate::model::{DatasetRecord, DatasetStatus};

/// Filter applied by a [`DatasetLookup`](crate::DatasetLookup).
///
/// Product type and status are always present; the rest narrows further.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFilter {
    pub product_type: String,
    pub status: DatasetStatus,
    /// Case-insensitive substring of the dataset name.
    pub name_contains: Option<String>,
    pub dataset_id: Option<String>,
    /// Datasets without a known extent always pass.
    pub bbox: Option<BoundingBox>,
}

impl DatasetFilter {
    /// Published datasets of one product.
    pub fn published(product_type: impl Into<String>) -> Self {
        Self {
            product_type: product_type.into(),
            status: DatasetStatus::Published,
            name_contains: None,
            dataset_id: None,
            bbox: None,
        }
    }

    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.name_contains = name.map(str::to_string);
        self
    }

    pub fn with_id(mut self, id: Option<&str>) -> Self {
        self.dataset_id = id.map(str::to_string);
        self
    }

    pub fn with_bbox(mut self, bbox: Option<BoundingBox>) -> Self {
        self.bbox = bbox;
        self
    }

    pub fn matches(&self, record: &DatasetRecord) -> bool {
        if !record.product_type.eq_ignore_ascii_case(&self.product_type) {
            return false;
        }
        if record.status != self.status {
            return false;
        }
        if let Some(name) = &self.name_contains {
            if !record.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(id) = &self.dataset_id {
            if &record.id != id {
                return false;
            }
        }
        if let Some(bbox) = &self.bbox {
            if let Some(extent) = record.extent() {
                if !extent.intersects(bbox) {
                    return false;
                }
            }
        }
        true
    }
}
