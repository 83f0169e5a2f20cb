use ogc_common::OgcError;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    /// An explicitly requested dataset does not exist.
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Invalid dataset record {id}: {message}")]
    InvalidRecord { id: String, message: String },
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

/// Only a "not found" from the catalog is a client-visible 404; any other
/// lookup failure is a server-side generation failure.
impl From<CatalogError> for OgcError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => {
                OgcError::NoMatchingDatasets(format!("dataset '{}' does not exist", id))
            }
            other => OgcError::GenerationFailure(format!("dataset lookup failed: {}", other)),
        }
    }
}
