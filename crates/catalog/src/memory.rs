//! In-memory dataset catalog.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::DatasetFilter;
use crate::lookup::DatasetLookup;
use crate::model::DatasetRecord;

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    datasets: RwLock<Vec<DatasetRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DatasetRecord>) -> Self {
        Self {
            datasets: RwLock::new(records),
        }
    }

    /// Insert or replace a dataset by id.
    pub async fn upsert(&self, record: DatasetRecord) {
        let mut datasets = self.datasets.write().await;
        match datasets.iter_mut().find(|d| d.id == record.id) {
            Some(existing) => *existing = record,
            None => datasets.push(record),
        }
    }

    pub async fn remove(&self, id: &str) -> Option<DatasetRecord> {
        let mut datasets = self.datasets.write().await;
        let index = datasets.iter().position(|d| d.id == id)?;
        Some(datasets.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.datasets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.datasets.read().await.is_empty()
    }
}

#[async_trait]
impl DatasetLookup for InMemoryCatalog {
    async fn find(&self, filter: &DatasetFilter) -> CatalogResult<Vec<DatasetRecord>> {
        let datasets = self.datasets.read().await;
        let mut matches: Vec<DatasetRecord> = datasets
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();

        if matches.is_empty() {
            if let Some(id) = &filter.dataset_id {
                return Err(CatalogError::NotFound(id.clone()));
            }
        }

        // Newest first; unpublished timestamps sort last.
        matches.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        debug!(
            product = %filter.product_type,
            matched = matches.len(),
            total = datasets.len(),
            "In-memory dataset lookup"
        );
        Ok(matches)
    }
}
