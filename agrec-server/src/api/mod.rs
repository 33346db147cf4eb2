//! HTTP API handlers for agrec-server

pub mod health;
pub mod recommend;
pub mod tables;

pub use health::health_routes;
pub use recommend::{load_data, serve_cached, serve_conditional, serve_refreshed};
pub use tables::{list_customers, list_interactions, list_product_categories, list_products};
