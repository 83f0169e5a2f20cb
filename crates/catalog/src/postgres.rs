//! Dataset catalog backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ogc_common::BoundingBox;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::DatasetFilter;
use crate::lookup::DatasetLookup;
use crate::model::{DatasetRecord, DatasetStatus, NodeRef};

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a new catalog connection from database URL.
    pub async fn connect(database_url: &str) -> CatalogResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| CatalogError::Database(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Create the catalog tables if they do not exist.
    pub async fn migrate(&self) -> CatalogResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| CatalogError::Database(format!("Migration failed: {}", e)))?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DatasetLookup for PgCatalog {
    async fn find(&self, filter: &DatasetFilter) -> CatalogResult<Vec<DatasetRecord>> {
        let name_pattern = filter.name_contains.as_deref().map(like_pattern);
        let bbox = filter.bbox;

        let rows = sqlx::query_as::<_, DatasetRow>(FIND_SQL)
            .bind(&filter.product_type)
            .bind(filter.status.as_str())
            .bind(name_pattern)
            .bind(filter.dataset_id.as_deref())
            .bind(bbox.map(|b| b.min_x))
            .bind(bbox.map(|b| b.min_y))
            .bind(bbox.map(|b| b.max_x))
            .bind(bbox.map(|b| b.max_y))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(format!("Query failed: {}", e)))?;

        debug!(product = %filter.product_type, matched = rows.len(), "Dataset lookup");

        if rows.is_empty() {
            if let Some(id) = &filter.dataset_id {
                return Err(CatalogError::NotFound(id.clone()));
            }
        }

        rows.into_iter().map(DatasetRecord::try_from).collect()
    }

    async fn ping(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Escape LIKE metacharacters and wrap in `%...%`.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(FromRow)]
struct DatasetRow {
    id: String,
    name: String,
    description: Option<String>,
    product_type: String,
    version: String,
    status: String,
    coverage: Option<String>,
    bbox_min_x: Option<f64>,
    bbox_min_y: Option<f64>,
    bbox_max_x: Option<f64>,
    bbox_max_y: Option<f64>,
    published_at: Option<DateTime<Utc>>,
    node_id: String,
    node_name: String,
    node_latitude: Option<f64>,
    node_longitude: Option<f64>,
}

impl TryFrom<DatasetRow> for DatasetRecord {
    type Error = CatalogError;

    fn try_from(row: DatasetRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<DatasetStatus>().map_err(|message| CatalogError::InvalidRecord {
            id: row.id.clone(),
            message,
        })?;
        let bbox = match (row.bbox_min_x, row.bbox_min_y, row.bbox_max_x, row.bbox_max_y) {
            (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => {
                Some(BoundingBox::new(min_x, min_y, max_x, max_y))
            }
            _ => None,
        };

        Ok(DatasetRecord {
            id: row.id,
            name: row.name,
            description: row.description,
            product_type: row.product_type,
            version: row.version,
            status,
            coverage: row.coverage,
            bbox,
            node: NodeRef {
                id: row.node_id,
                name: row.node_name,
                latitude: row.node_latitude,
                longitude: row.node_longitude,
            },
            published_at: row.published_at,
        })
    }
}

const FIND_SQL: &str = r#"
SELECT d.id, d.name, d.description, d.product_type, d.version, d.status, d.coverage,
       d.bbox_min_x, d.bbox_min_y, d.bbox_max_x, d.bbox_max_y, d.published_at,
       n.id AS node_id, n.name AS node_name,
       n.latitude AS node_latitude, n.longitude AS node_longitude
FROM datasets d
JOIN nodes n ON n.id = d.node_id
WHERE d.product_type = $1
  AND d.status = $2
  AND ($3::TEXT IS NULL OR d.name ILIKE $3)
  AND ($4::TEXT IS NULL OR d.id = $4)
  AND ($5::FLOAT8 IS NULL OR d.bbox_min_x IS NULL
       OR (d.bbox_min_x <= $7 AND d.bbox_max_x >= $5
           AND d.bbox_min_y <= $8 AND d.bbox_max_y >= $6))
ORDER BY d.published_at DESC NULLS LAST
"#;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION
);

CREATE TABLE IF NOT EXISTS datasets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    product_type VARCHAR(16) NOT NULL,
    version VARCHAR(32) NOT NULL DEFAULT '1.0.0',
    status VARCHAR(20) NOT NULL DEFAULT 'DRAFT',
    coverage TEXT,
    bbox_min_x DOUBLE PRECISION,
    bbox_min_y DOUBLE PRECISION,
    bbox_max_x DOUBLE PRECISION,
    bbox_max_y DOUBLE PRECISION,
    node_id TEXT NOT NULL REFERENCES nodes(id),
    published_at TIMESTAMPTZ
);

CREATE INDEX IF NOT EXISTS idx_datasets_product_status ON datasets(product_type, status);
CREATE INDEX IF NOT EXISTS idx_datasets_published_at ON datasets(published_at DESC)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("port"), "%port%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn row_with_partial_bbox_has_no_extent() {
        let row = DatasetRow {
            id: "ds".into(),
            name: "n".into(),
            description: None,
            product_type: "S102".into(),
            version: "1.0.0".into(),
            status: "PUBLISHED".into(),
            coverage: None,
            bbox_min_x: Some(1.0),
            bbox_min_y: None,
            bbox_max_x: Some(2.0),
            bbox_max_y: Some(2.0),
            published_at: None,
            node_id: "node".into(),
            node_name: "Node".into(),
            node_latitude: None,
            node_longitude: None,
        };
        let record = DatasetRecord::try_from(row).unwrap();
        assert!(record.bbox.is_none());
    }

    #[test]
    fn row_with_unknown_status_is_rejected() {
        let row = DatasetRow {
            id: "ds".into(),
            name: "n".into(),
            description: None,
            product_type: "S102".into(),
            version: "1.0.0".into(),
            status: "LOST".into(),
            coverage: None,
            bbox_min_x: None,
            bbox_min_y: None,
            bbox_max_x: None,
            bbox_max_y: None,
            published_at: None,
            node_id: "node".into(),
            node_name: "Node".into(),
            node_latitude: None,
            node_longitude: None,
        };
        assert!(matches!(
            DatasetRecord::try_from(row),
            Err(CatalogError::InvalidRecord { .. })
        ));
    }
}
