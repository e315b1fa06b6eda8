//! HTTP surface of the optimizer
//!
//! Exposes the scoring library over JSON so dashboards can post the rows
//! they fetched and render the returned structures directly.

pub mod api;
pub mod config;

pub use api::{create_router, serve, AppState};
pub use config::ServiceConfig;
