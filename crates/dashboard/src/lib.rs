//! Web dashboard for the child nutritional status classifier.
//!
//! Serves a prediction page, a data and model report page, and a small JSON
//! API on top of [`gizi_core`].

pub mod charts;
pub mod config;
pub mod form;
pub mod render;
pub mod routes;

pub use config::{ConfigError, DashboardConfig};
pub use routes::{build_router, AppState};
