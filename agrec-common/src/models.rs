//! Raw record models for the four source tables

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One customer/product interaction (the fact table).
///
/// `interaction_type`: 1 = click, 2 = save, 3 = unsave
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub interaction_type: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    pub price: f64,
    pub image_url: String,
    pub description: String,
    pub category_id: Uuid,
    pub available_quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductCategory {
    pub id: Uuid,
    pub category_name: String,
    pub category_code: i64,
}
