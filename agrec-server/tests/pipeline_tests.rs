//! Integration tests for the refresh pipeline
//!
//! Covers the end-to-end scenario (seeded shop database through to the
//! cleaned feature table), the join-loss property, the projection contract,
//! freshness-log behavior on success and failure, and the
//! at-most-one-concurrent-run contract.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agrec_common::models::{Customer, Interaction, Product, ProductCategory};
use agrec_common::{Error, Result};
use agrec_server::artifacts::{
    ArtifactStore, AGGREGATED_FILE, INTERACTIONS_FILE, PRE_PROCESSED_FILE, PROCESSED_FILE,
};
use agrec_server::pipeline::freshness::FreshnessLog;
use agrec_server::pipeline::project::EXCLUDED_COLUMNS;
use agrec_server::pipeline::RefreshPipeline;
use agrec_server::store::{SourceStore, SqliteSourceStore};
use agrec_server::table::Value;
use async_trait::async_trait;
use uuid::Uuid;

const ONE_HOUR: Duration = Duration::from_secs(3600);

async fn seeded_pipeline(
    dir: &tempfile::TempDir,
) -> (common::ShopFixture, ArtifactStore, RefreshPipeline) {
    let pool = common::setup_source_db(dir.path()).await;
    let fixture = common::seed_shop_fixture(&pool).await;
    let store = Arc::new(SqliteSourceStore::new(pool));
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    let pipeline = RefreshPipeline::new(store, artifacts.clone());
    (fixture, artifacts, pipeline)
}

#[tokio::test]
async fn test_end_to_end_run_produces_four_row_feature_table() {
    let dir = tempfile::tempdir().unwrap();
    let (fixture, artifacts, pipeline) = seeded_pipeline(&dir).await;

    pipeline.run().await.unwrap();

    let interactions = artifacts.load_table(INTERACTIONS_FILE).unwrap();
    assert_eq!(interactions.row_count(), 5);

    // One interaction references a missing customer, so the join drops it
    let aggregated = artifacts.load_table(AGGREGATED_FILE).unwrap();
    assert_eq!(aggregated.row_count(), 4);
    assert!(aggregated.row_count() <= interactions.row_count());

    // No nulls and no duplicates in the fixture, so cleaning keeps all rows
    let cleaned = artifacts.load_table(PRE_PROCESSED_FILE).unwrap();
    assert_eq!(cleaned.row_count(), 4);
    assert!(!cleaned.rows().iter().flatten().any(Value::is_null));

    // The dangling customer appears nowhere in the aggregate
    let customer_col = aggregated.column_index("customer_id").unwrap();
    let dangling = Value::Text(fixture.dangling_customer.to_string());
    assert!(!aggregated.rows().iter().any(|row| row[customer_col] == dangling));
}

#[tokio::test]
async fn test_processed_columns_are_aggregate_minus_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    let (_fixture, artifacts, pipeline) = seeded_pipeline(&dir).await;

    pipeline.run().await.unwrap();

    let aggregated = artifacts.load_table(AGGREGATED_FILE).unwrap();
    let processed = artifacts.load_table(PROCESSED_FILE).unwrap();

    let expected: Vec<&str> = aggregated
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| !EXCLUDED_COLUMNS.contains(c))
        .collect();
    assert_eq!(processed.columns(), expected.as_slice());

    // Every excluded column was actually present in the aggregate
    for column in EXCLUDED_COLUMNS {
        assert!(aggregated.column_index(column).is_some(), "missing {column}");
        assert!(processed.column_index(column).is_none(), "kept {column}");
    }
}

#[tokio::test]
async fn test_successful_run_marks_cache_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let (_fixture, artifacts, pipeline) = seeded_pipeline(&dir).await;

    let log = FreshnessLog::new(artifacts.refresh_log_path());
    assert!(log.is_stale(ONE_HOUR));

    pipeline.run().await.unwrap();
    assert!(!log.is_stale(ONE_HOUR));
}

#[tokio::test]
async fn test_empty_source_produces_empty_feature_table() {
    let dir = tempfile::tempdir().unwrap();
    let pool = common::setup_source_db(dir.path()).await;
    // Schema only, no rows seeded
    let store = Arc::new(SqliteSourceStore::new(pool));
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    let pipeline = RefreshPipeline::new(store, artifacts.clone());

    pipeline.run().await.unwrap();

    let cleaned = artifacts.load_table(PRE_PROCESSED_FILE).unwrap();
    assert!(cleaned.is_empty());
    assert!(!cleaned.columns().is_empty());
}

/// Store whose every fetch fails
struct UnreachableStore;

#[async_trait]
impl SourceStore for UnreachableStore {
    async fn fetch_interactions(&self) -> Result<Vec<Interaction>> {
        Err(Error::SourceUnavailable("store offline".to_string()))
    }
    async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        Err(Error::SourceUnavailable("store offline".to_string()))
    }
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        Err(Error::SourceUnavailable("store offline".to_string()))
    }
    async fn fetch_product_categories(&self) -> Result<Vec<ProductCategory>> {
        Err(Error::SourceUnavailable("store offline".to_string()))
    }
}

#[tokio::test]
async fn test_failed_run_leaves_freshness_log_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    let pipeline = RefreshPipeline::new(Arc::new(UnreachableStore), artifacts.clone());

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable(_)));

    // No stamp was written, so the next conditional request still refreshes
    assert!(!artifacts.refresh_log_path().exists());
    let log = FreshnessLog::new(artifacts.refresh_log_path());
    assert!(log.is_stale(ONE_HOUR));
}

/// In-memory store that counts how many extraction passes hit it
struct CountingStore {
    product: Uuid,
    customer: Uuid,
    category: Uuid,
    fetches: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            product: Uuid::new_v4(),
            customer: Uuid::new_v4(),
            category: Uuid::new_v4(),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceStore for CountingStore {
    async fn fetch_interactions(&self) -> Result<Vec<Interaction>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Hold the stage long enough for the second caller to queue
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(vec![Interaction {
            id: Uuid::new_v4(),
            customer_id: self.customer,
            product_id: self.product,
            interaction_type: 1,
        }])
    }
    async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        Ok(vec![Customer {
            id: self.customer,
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            email: "first.last@example.com".to_string(),
            phone: "+94000000".to_string(),
        }])
    }
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        Ok(vec![Product {
            id: self.product,
            product_name: "Product".to_string(),
            price: 1.99,
            image_url: "https://img.example.com/p.png".to_string(),
            description: "A product".to_string(),
            category_id: self.category,
            available_quantity: 10,
        }])
    }
    async fn fetch_product_categories(&self) -> Result<Vec<ProductCategory>> {
        Ok(vec![ProductCategory {
            id: self.category,
            category_name: "Fruits".to_string(),
            category_code: 1,
        }])
    }
}

#[tokio::test]
async fn test_concurrent_conditional_refreshes_collapse_into_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CountingStore::new());
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    let pipeline = Arc::new(RefreshPipeline::new(store.clone(), artifacts.clone()));

    // Stale log, two simultaneous conditional requests
    let (a, b) = tokio::join!(
        pipeline.run_if_stale(ONE_HOUR),
        pipeline.run_if_stale(ONE_HOUR)
    );
    let ran_a = a.unwrap();
    let ran_b = b.unwrap();

    // Exactly one execution; the other caller collapsed into it
    assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    assert!(ran_a ^ ran_b);

    // Both callers observe a fully completed run
    let cleaned = artifacts.load_table(PRE_PROCESSED_FILE).unwrap();
    assert_eq!(cleaned.row_count(), 1);
}

#[tokio::test]
async fn test_conditional_refresh_skips_when_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CountingStore::new());
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    let pipeline = RefreshPipeline::new(store.clone(), artifacts);

    assert!(pipeline.run_if_stale(ONE_HOUR).await.unwrap());
    assert_eq!(store.fetches.load(Ordering::SeqCst), 1);

    // Cache is now fresh; nothing to do
    assert!(!pipeline.run_if_stale(ONE_HOUR).await.unwrap());
    assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_forced_runs_queue_behind_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CountingStore::new());
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    let pipeline = Arc::new(RefreshPipeline::new(store.clone(), artifacts));

    let (a, b) = tokio::join!(pipeline.run(), pipeline.run());
    a.unwrap();
    b.unwrap();

    // Forced refreshes do not collapse; they serialize
    assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
}
