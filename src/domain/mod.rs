//! Core domain types and logic.

pub mod chart_layout;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod position;
pub mod raster;
pub mod series;
pub mod strategy;
pub mod summary;
pub mod trend;
