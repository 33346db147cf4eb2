//! Recommendation serving endpoints
//!
//! Three policies over the same pipeline primitive:
//! - `/recommendation/:user_id` serves straight from the cached feature
//!   table, no refresh.
//! - `/recommendation-load/:user_id` always refreshes first.
//! - `/recommendation-load-update/:user_id` refreshes only if the freshness
//!   log says the cache is older than the staleness threshold.
//!
//! Plus `/load-data`, which runs the refresh without serving anything.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiResult;
use crate::pipeline::freshness::DEFAULT_STALENESS_THRESHOLD;
use crate::AppState;

/// Result cap applied when the caller does not pass `num_of_rec`
pub const DEFAULT_NUM_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub num_of_rec: Option<usize>,
}

impl RecommendParams {
    fn num_of_rec(&self) -> usize {
        self.num_of_rec.unwrap_or(DEFAULT_NUM_RECOMMENDATIONS)
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<String>,
}

/// GET /recommendation/:user_id
///
/// Serve from the cached feature table as-is. The freshness log is stamped
/// afterward even though nothing was refreshed: a deliberate cache-warming
/// policy, not an oversight (see DESIGN.md).
pub async fn serve_cached(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<Json<RecommendationResponse>> {
    let recommendation = state.engine.recommend(&user_id, params.num_of_rec())?;
    state.pipeline.freshness().record_refresh()?;
    Ok(Json(RecommendationResponse {
        recommendations: recommendation.items,
    }))
}

/// GET /recommendation-load/:user_id
///
/// Run the full refresh pipeline, then serve.
pub async fn serve_refreshed(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<Json<RecommendationResponse>> {
    state.pipeline.run().await?;
    let recommendation = state.engine.recommend(&user_id, params.num_of_rec())?;
    Ok(Json(RecommendationResponse {
        recommendations: recommendation.items,
    }))
}

/// GET /recommendation-load-update/:user_id
///
/// Refresh only if the cache is stale, then serve.
pub async fn serve_conditional(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<Json<RecommendationResponse>> {
    state
        .pipeline
        .run_if_stale(DEFAULT_STALENESS_THRESHOLD)
        .await?;
    let recommendation = state.engine.recommend(&user_id, params.num_of_rec())?;
    Ok(Json(RecommendationResponse {
        recommendations: recommendation.items,
    }))
}

/// GET /load-data
///
/// Run the refresh pipeline without serving a recommendation.
pub async fn load_data(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    state.pipeline.run().await?;
    Ok(Json(json!({ "status": "success" })))
}
