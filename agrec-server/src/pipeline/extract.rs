//! Extraction stage
//!
//! Fetches the four raw collections from the source store and persists each
//! as a tabular snapshot, so the later stages can run without touching the
//! store again. Store ids are coerced to strings on the way in; the tabular
//! layer only ever sees stable scalars.

use agrec_common::models::{Customer, Interaction, Product, ProductCategory};
use agrec_common::Result;
use tracing::info;

use crate::artifacts::{
    ArtifactStore, CUSTOMERS_FILE, INTERACTIONS_FILE, PRODUCTS_FILE, PRODUCT_CATEGORIES_FILE,
};
use crate::store::SourceStore;
use crate::table::Table;

/// Fetch all four collections and persist their snapshots.
///
/// Empty collections are valid: the snapshot still carries its column
/// schema, and the join stage will produce an empty aggregate.
pub async fn extract(store: &dyn SourceStore, artifacts: &ArtifactStore) -> Result<()> {
    let interactions = store.fetch_interactions().await?;
    let customers = store.fetch_customers().await?;
    let products = store.fetch_products().await?;
    let categories = store.fetch_product_categories().await?;

    info!(
        "Extracted {} interactions, {} customers, {} products, {} categories",
        interactions.len(),
        customers.len(),
        products.len(),
        categories.len()
    );

    artifacts.save_table(INTERACTIONS_FILE, &interactions_table(&interactions)?)?;
    artifacts.save_table(CUSTOMERS_FILE, &customers_table(&customers)?)?;
    artifacts.save_table(PRODUCTS_FILE, &products_table(&products)?)?;
    artifacts.save_table(PRODUCT_CATEGORIES_FILE, &categories_table(&categories)?)?;
    Ok(())
}

fn interactions_table(records: &[Interaction]) -> Result<Table> {
    let mut table = Table::new(vec!["id", "customer_id", "product_id", "interaction_type"]);
    for r in records {
        table.push_row(vec![
            r.id.to_string().into(),
            r.customer_id.to_string().into(),
            r.product_id.to_string().into(),
            r.interaction_type.into(),
        ])?;
    }
    Ok(table)
}

fn customers_table(records: &[Customer]) -> Result<Table> {
    let mut table = Table::new(vec!["id", "first_name", "last_name", "email", "phone"]);
    for r in records {
        table.push_row(vec![
            r.id.to_string().into(),
            r.first_name.clone().into(),
            r.last_name.clone().into(),
            r.email.clone().into(),
            r.phone.clone().into(),
        ])?;
    }
    Ok(table)
}

fn products_table(records: &[Product]) -> Result<Table> {
    let mut table = Table::new(vec![
        "id",
        "product_name",
        "price",
        "image_url",
        "description",
        "category_id",
        "available_quantity",
    ]);
    for r in records {
        table.push_row(vec![
            r.id.to_string().into(),
            r.product_name.clone().into(),
            r.price.into(),
            r.image_url.clone().into(),
            r.description.clone().into(),
            r.category_id.to_string().into(),
            r.available_quantity.into(),
        ])?;
    }
    Ok(table)
}

fn categories_table(records: &[ProductCategory]) -> Result<Table> {
    let mut table = Table::new(vec!["id", "category_name", "category_code"]);
    for r in records {
        table.push_row(vec![
            r.id.to_string().into(),
            r.category_name.clone().into(),
            r.category_code.into(),
        ])?;
    }
    Ok(table)
}
