//! Sqlite-backed source store

use std::path::Path;
use std::time::Duration;

use agrec_common::models::{Customer, Interaction, Product, ProductCategory};
use agrec_common::{Error, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

use super::SourceStore;

/// Safety ceiling on rows per fetch. Reads are cursor-streamed, so this is
/// not a working limit; hitting it truncates the result and logs a warning.
pub const DEFAULT_FETCH_CAP: usize = 100_000;

/// Upper bound on a single collection fetch. A stalled store must not wedge
/// the refresh orchestrator.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source store backed by a read-only sqlite connection pool
pub struct SqliteSourceStore {
    pool: SqlitePool,
    fetch_cap: usize,
    fetch_timeout: Duration,
}

impl SqliteSourceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            fetch_cap: DEFAULT_FETCH_CAP,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_cap(mut self, cap: usize) -> Self {
        self.fetch_cap = cap;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Connect to the shop database in read-only mode.
    ///
    /// This service never writes to the source; mode=ro makes that a
    /// database-level guarantee.
    pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
        if !db_path.exists() {
            return Err(Error::Config(format!(
                "Source database not found: {}",
                db_path.display()
            )));
        }

        let db_url = format!("sqlite://{}?mode=ro", db_path.display());
        let pool = SqlitePool::connect(&db_url).await.map_err(|e| {
            Error::SourceUnavailable(format!(
                "failed to connect to {}: {e}",
                db_path.display()
            ))
        })?;
        Ok(pool)
    }

    /// Stream every row of one collection, bounded by the cap and timeout
    async fn fetch_all<T>(&self, sql: &str, collection: &str) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let fetch = async {
            let mut stream = sqlx::query_as::<_, T>(sql).fetch(&self.pool);
            let mut records = Vec::new();
            while let Some(record) = stream
                .try_next()
                .await
                .map_err(|e| Error::SourceUnavailable(format!("{collection} fetch failed: {e}")))?
            {
                records.push(record);
                if records.len() >= self.fetch_cap {
                    warn!(
                        "{} fetch hit the safety ceiling of {} rows; result truncated",
                        collection, self.fetch_cap
                    );
                    break;
                }
            }
            Ok(records)
        };

        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(Error::SourceUnavailable(format!(
                "{collection} fetch timed out after {:?}",
                self.fetch_timeout
            ))),
        }
    }
}

#[async_trait]
impl SourceStore for SqliteSourceStore {
    async fn fetch_interactions(&self) -> Result<Vec<Interaction>> {
        self.fetch_all(
            "SELECT id, customer_id, product_id, interaction_type FROM interactions",
            "interactions",
        )
        .await
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        self.fetch_all(
            "SELECT id, first_name, last_name, email, phone FROM customers",
            "customers",
        )
        .await
    }

    async fn fetch_products(&self) -> Result<Vec<Product>> {
        self.fetch_all(
            "SELECT id, product_name, price, image_url, description, category_id, \
             available_quantity FROM products",
            "products",
        )
        .await
    }

    async fn fetch_product_categories(&self) -> Result<Vec<ProductCategory>> {
        self.fetch_all(
            "SELECT id, category_name, category_code FROM product_categories",
            "product_categories",
        )
        .await
    }
}
