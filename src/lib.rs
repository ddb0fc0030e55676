//! Synthesize a radiation time series, publish its hourly cumulative mean,
//! and reconstruct the hourly values from the published readings.

pub mod config;
pub mod generator;
pub mod manager;
pub mod model;
pub mod reconstruct;
pub mod render;
pub mod stats;
