//! Durable pipeline artifacts
//!
//! All intermediate and final tables live as JSON files under one data root,
//! with fixed names. Writes are atomic publishes: serialize into a sibling
//! `.tmp` file, then rename over the target, so a concurrent reader never
//! observes a half-written table.

use std::path::{Path, PathBuf};

use agrec_common::{Error, Result};

use crate::table::Table;

/// Raw snapshot of the interactions collection
pub const INTERACTIONS_FILE: &str = "interactions.json";
/// Raw snapshot of the customers collection
pub const CUSTOMERS_FILE: &str = "customers.json";
/// Raw snapshot of the products collection
pub const PRODUCTS_FILE: &str = "products.json";
/// Raw snapshot of the product categories collection
pub const PRODUCT_CATEGORIES_FILE: &str = "product_categories.json";
/// Denormalized join of the four snapshots
pub const AGGREGATED_FILE: &str = "aggregated.json";
/// Aggregated table minus non-predictive columns
pub const PROCESSED_FILE: &str = "processed.json";
/// Cleaned feature table the recommendation engine reads
pub const PRE_PROCESSED_FILE: &str = "pre_processed.json";
/// Freshness log holding the last-refresh stamp
pub const REFRESH_LOG_FILE: &str = "refresh_log.txt";

/// Write `contents` to `path` atomically via a sibling tmp file and rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

/// Handle on the data root holding every pipeline artifact.
///
/// Passed explicitly to each component at construction; there is no ambient
/// global table-path state.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a named artifact
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path of the freshness log
    pub fn refresh_log_path(&self) -> PathBuf {
        self.path(REFRESH_LOG_FILE)
    }

    /// Persist a table under `name`, replacing any prior version
    pub fn save_table(&self, name: &str, table: &Table) -> Result<()> {
        let contents = serde_json::to_vec(table)
            .map_err(|e| Error::Internal(format!("serialize {name}: {e}")))?;
        write_atomic(&self.path(name), &contents)?;
        Ok(())
    }

    /// Load a previously persisted table
    pub fn load_table(&self, name: &str) -> Result<Table> {
        let path = self.path(name);
        let contents = std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("artifact {name} (run the refresh pipeline first)"))
            } else {
                Error::Io(e)
            }
        })?;
        serde_json::from_slice(&contents)
            .map_err(|e| Error::Internal(format!("deserialize {name}: {e}")))
    }
}
