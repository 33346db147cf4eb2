//! agrec-server library
//!
//! The recommendation serving layer: an HTTP surface over a staleness-gated
//! refresh pipeline that keeps a denormalized feature table synchronized
//! from the shop's backing store.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod artifacts;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod table;

use engine::Recommender;
use pipeline::RefreshPipeline;
use store::SourceStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Read access to the four raw collections
    pub store: Arc<dyn SourceStore>,
    /// Refresh orchestrator over the shared artifacts
    pub pipeline: Arc<RefreshPipeline>,
    /// Scoring engine behind its opaque seam
    pub engine: Arc<dyn Recommender>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: Arc<dyn SourceStore>,
        pipeline: Arc<RefreshPipeline>,
        engine: Arc<dyn Recommender>,
    ) -> Self {
        Self {
            store,
            pipeline,
            engine,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/interactions", get(api::list_interactions))
        .route("/customers", get(api::list_customers))
        .route("/products", get(api::list_products))
        .route("/product-categories", get(api::list_product_categories))
        .route("/recommendation/:user_id", get(api::serve_cached))
        .route("/recommendation-load/:user_id", get(api::serve_refreshed))
        .route(
            "/recommendation-load-update/:user_id",
            get(api::serve_conditional),
        )
        .route("/load-data", get(api::load_data))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
