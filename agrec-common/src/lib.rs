//! # AGREC Common Library
//!
//! Shared code for the AGREC recommendation service:
//! - Error types
//! - Configuration and data-root resolution
//! - Raw record models for the four source tables
//! - Refresh-stamp formatting

pub mod config;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
