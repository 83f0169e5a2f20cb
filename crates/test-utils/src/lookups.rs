//! Catalog doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use catalog::{CatalogError, CatalogResult, DatasetFilter, DatasetLookup, DatasetRecord};

/// Fails every lookup with a `CatalogError` built by `make`.
pub struct FailingLookup {
    make: fn() -> CatalogError,
}

impl FailingLookup {
    /// Backend failure, e.g. a lost database connection.
    pub fn database() -> Self {
        Self {
            make: || CatalogError::Database("connection refused".to_string()),
        }
    }

    /// The explicitly requested dataset does not exist.
    pub fn not_found() -> Self {
        Self {
            make: || CatalogError::NotFound("missing-dataset".to_string()),
        }
    }
}

#[async_trait]
impl DatasetLookup for FailingLookup {
    async fn find(&self, _filter: &DatasetFilter) -> CatalogResult<Vec<DatasetRecord>> {
        Err((self.make)())
    }

    async fn ping(&self) -> CatalogResult<()> {
        Err((self.make)())
    }
}

/// Wraps a lookup and records how often it was consulted and with what.
pub struct CountingLookup<L> {
    inner: L,
    calls: AtomicUsize,
    last: std::sync::Mutex<Option<DatasetFilter>>,
}

impl<L: DatasetLookup> CountingLookup<L> {
    pub fn new(inner: L) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
            last: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_filter(&self) -> Option<DatasetFilter> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl<L: DatasetLookup> DatasetLookup for CountingLookup<L> {
    async fn find(&self, filter: &DatasetFilter) -> CatalogResult<Vec<DatasetRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(filter.clone());
        self.inner.find(filter).await
    }
}
