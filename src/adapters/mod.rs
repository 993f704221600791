//! Concrete adapter implementations for ports, plus the bitmap renderer.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod png_adapter;
pub mod raster_chart;
