use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::filter::DatasetFilter;
use crate::model::DatasetRecord;

/// Read-only dataset query used by every protocol handler.
///
/// Implementations return matches newest-first by publication time. When the
/// filter names an explicit `dataset_id` that does not exist they return
/// [`CatalogError::NotFound`](crate::CatalogError::NotFound).
#[async_trait]
pub trait DatasetLookup: Send + Sync {
    async fn find(&self, filter: &DatasetFilter) -> CatalogResult<Vec<DatasetRecord>>;

    /// Cheap connectivity probe for readiness checks.
    async fn ping(&self) -> CatalogResult<()> {
        Ok(())
    }
}
