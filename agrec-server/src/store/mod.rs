//! Source store access
//!
//! The four raw collections live in a backing shop database that this
//! service only ever reads. The `SourceStore` trait is the narrow boundary
//! the pipeline extracts through; production uses the sqlite-backed
//! implementation, tests substitute their own.

use agrec_common::models::{Customer, Interaction, Product, ProductCategory};
use agrec_common::Result;
use async_trait::async_trait;

mod sqlite;
pub use sqlite::{SqliteSourceStore, DEFAULT_FETCH_CAP, DEFAULT_FETCH_TIMEOUT};

/// Read access to the four raw collections.
///
/// Each fetch returns the full record set, bounded by the implementation's
/// safety ceiling. An empty collection is a valid result, not an error.
#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn fetch_interactions(&self) -> Result<Vec<Interaction>>;
    async fn fetch_customers(&self) -> Result<Vec<Customer>>;
    async fn fetch_products(&self) -> Result<Vec<Product>>;
    async fn fetch_product_categories(&self) -> Result<Vec<ProductCategory>>;
}
