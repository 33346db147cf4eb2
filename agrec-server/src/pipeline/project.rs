//! Projection stage
//!
//! Strips the aggregate of columns that carry no recommendation signal or
//! leak dimension data into the feature table. The drop list is a hard
//! contract with the aggregation stage's output shape: a listed column that
//! is missing fails the run rather than being skipped.

use agrec_common::Result;
use tracing::info;

use crate::artifacts::{ArtifactStore, AGGREGATED_FILE, PROCESSED_FILE};
use crate::table::Table;

/// Columns removed from the aggregate before cleaning: identifiers,
/// stock/display attributes, and customer personal data.
pub const EXCLUDED_COLUMNS: &[&str] = &[
    "category_id",
    "id",
    "available_quantity",
    "image_url",
    "price",
    "phone",
    "email",
    "first_name",
    "last_name",
];

/// Project the aggregate down to its signal columns and persist the result
pub fn process(artifacts: &ArtifactStore) -> Result<Table> {
    let aggregated = artifacts.load_table(AGGREGATED_FILE)?;
    let processed = aggregated.drop_columns(EXCLUDED_COLUMNS, "process")?;

    info!(
        "Projected {} columns down to {}",
        aggregated.columns().len(),
        processed.columns().len()
    );

    artifacts.save_table(PROCESSED_FILE, &processed)?;
    Ok(processed)
}
