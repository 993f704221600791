//! Port traits at the I/O seams of the pipeline.

pub mod config_port;
pub mod price_port;
pub mod raster_port;
