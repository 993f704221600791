//! trendplot: EMA crossover simulation and price chart rendering.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], wiring in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
