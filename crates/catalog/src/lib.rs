//! Dataset catalog consulted by the OGC services.
//!
//! The services only ever read published datasets through [`DatasetLookup`];
//! two implementations are provided: an in-memory catalog for tests and
//! single-node deployments, and a PostgreSQL catalog.

pub mod error;
pub mod filter;
pub mod lookup;
pub mod memory;
pub mod model;
pub mod postgres;

pub use error::{CatalogError, CatalogResult};
pub use filter::DatasetFilter;
pub use lookup::DatasetLookup;
pub use memory::InMemoryCatalog;
pub use model::{DatasetRecord, DatasetStatus, NodeRef};
pub use postgres::PgCatalog;
