//! Aggregation stage
//!
//! Denormalizes the four snapshots into one table through three sequential
//! inner joins, in fixed order: interactions to customers, then products,
//! then product categories. Interactions with dangling foreign keys fall out
//! silently; the aggregate never has more rows than the interactions
//! snapshot.

use agrec_common::Result;
use tracing::info;

use crate::artifacts::{
    ArtifactStore, AGGREGATED_FILE, CUSTOMERS_FILE, INTERACTIONS_FILE, PRODUCTS_FILE,
    PRODUCT_CATEGORIES_FILE,
};
use crate::table::Table;

/// Join the four snapshots and persist the aggregate
pub fn aggregate(artifacts: &ArtifactStore) -> Result<Table> {
    let interactions = artifacts.load_table(INTERACTIONS_FILE)?;
    let customers = artifacts.load_table(CUSTOMERS_FILE)?;
    let products = artifacts.load_table(PRODUCTS_FILE)?;
    let categories = artifacts.load_table(PRODUCT_CATEGORIES_FILE)?;

    let interaction_count = interactions.row_count();

    let aggregated = interactions
        .inner_join(&customers, "customer_id", "id")?
        .inner_join(&products, "product_id", "id")?
        .inner_join(&categories, "category_id", "id")?;

    info!(
        "Aggregated {} of {} interactions ({} dropped on unmatched keys)",
        aggregated.row_count(),
        interaction_count,
        interaction_count - aggregated.row_count()
    );

    artifacts.save_table(AGGREGATED_FILE, &aggregated)?;
    Ok(aggregated)
}
