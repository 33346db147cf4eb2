//! Recommendation engine seam
//!
//! The serving layer treats scoring as a black box behind `Recommender`:
//! a user id and a result cap in, a ranked item list and an opaque
//! statistics payload out. The default implementation reads the cleaned
//! feature table from durable storage at call time; swapping in a real
//! model never touches the pipeline or the HTTP surface.

use std::collections::{HashMap, HashSet};

use agrec_common::{Error, Result};
use serde_json::json;

use crate::artifacts::{ArtifactStore, PRE_PROCESSED_FILE};
use crate::table::Value;

/// Ranked recommendation result
#[derive(Debug, Clone)]
pub struct Recommendation {
    /// Recommended product ids, best first
    pub items: Vec<String>,
    /// Engine-specific summary statistics; callers may discard this
    pub stats: serde_json::Value,
}

/// Opaque scoring function over the cleaned feature table
pub trait Recommender: Send + Sync {
    fn recommend(&self, user_id: &str, max_results: usize) -> Result<Recommendation>;
}

/// Default engine: products ranked by accumulated interaction weight.
///
/// Click counts for 1, save for 3, unsave for -1. Products the user has
/// already interacted with rank behind fresh ones, so repeat
/// recommendations only appear once the catalog runs out of fresh items.
pub struct InteractionWeightRecommender {
    artifacts: ArtifactStore,
}

const CLICK_WEIGHT: f64 = 1.0;
const SAVE_WEIGHT: f64 = 3.0;
const UNSAVE_WEIGHT: f64 = -1.0;

impl InteractionWeightRecommender {
    pub fn new(artifacts: ArtifactStore) -> Self {
        Self { artifacts }
    }

    fn weight(interaction_type: &Value) -> f64 {
        match interaction_type {
            Value::Int(1) => CLICK_WEIGHT,
            Value::Int(2) => SAVE_WEIGHT,
            Value::Int(3) => UNSAVE_WEIGHT,
            _ => 0.0,
        }
    }
}

impl Recommender for InteractionWeightRecommender {
    fn recommend(&self, user_id: &str, max_results: usize) -> Result<Recommendation> {
        let table = self.artifacts.load_table(PRE_PROCESSED_FILE)?;

        let customer_idx = table
            .column_index("customer_id")
            .ok_or_else(|| Error::schema_mismatch("recommend", "customer_id"))?;
        let product_idx = table
            .column_index("product_id")
            .ok_or_else(|| Error::schema_mismatch("recommend", "product_id"))?;
        let type_idx = table
            .column_index("interaction_type")
            .ok_or_else(|| Error::schema_mismatch("recommend", "interaction_type"))?;

        let mut scores: HashMap<String, f64> = HashMap::new();
        let mut seen_by_user: HashSet<String> = HashSet::new();
        let mut user_interactions = 0usize;

        for row in table.rows() {
            let Value::Text(product_id) = &row[product_idx] else {
                continue;
            };
            *scores.entry(product_id.clone()).or_insert(0.0) += Self::weight(&row[type_idx]);

            if matches!(&row[customer_idx], Value::Text(c) if c == user_id) {
                user_interactions += 1;
                seen_by_user.insert(product_id.clone());
            }
        }

        let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
        ranked.sort_by(|(a_id, a_score), (b_id, b_score)| {
            let a_seen = seen_by_user.contains(a_id);
            let b_seen = seen_by_user.contains(b_id);
            a_seen
                .cmp(&b_seen)
                .then(b_score.total_cmp(a_score))
                .then(a_id.cmp(b_id))
        });

        let stats = json!({
            "user_interactions": user_interactions,
            "distinct_products": ranked.len(),
        });

        Ok(Recommendation {
            items: ranked
                .into_iter()
                .take(max_results)
                .map(|(id, _)| id)
                .collect(),
            stats,
        })
    }
}
