//! Raw-collection listing endpoints
//!
//! Pass-through reads against the source store, untouched by the refresh
//! pipeline. Useful for inspecting what the extraction stage will see.

use agrec_common::models::{Customer, Interaction, Product, ProductCategory};
use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::AppState;

/// GET /interactions
pub async fn list_interactions(State(state): State<AppState>) -> ApiResult<Json<Vec<Interaction>>> {
    Ok(Json(state.store.fetch_interactions().await?))
}

/// GET /customers
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.store.fetch_customers().await?))
}

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.fetch_products().await?))
}

/// GET /product-categories
pub async fn list_product_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProductCategory>>> {
    Ok(Json(state.store.fetch_product_categories().await?))
}
