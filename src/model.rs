//! Record types exchanged between the pipeline stages.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Radiation reading at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp of the reading.
    pub time: NaiveDateTime,

    /// Instantaneous radiation (W/m²), never negative.
    pub radiation: f64,

    /// Duration of the time step (hours).
    pub time_diff: f64,

    /// Integral of the radiation since the series start (W·h/m²).
    pub cumulative_area: f64,

    /// Average radiation since the series start (W/m²).
    pub cumulative_mean: f64,
}

/// Published value of a clock hour.
///
/// Holds the cumulative mean of the last sample falling in `hour`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub hour: NaiveDateTime,

    pub cumulative_mean: f64,
}

/// Hourly record with the average radiation recovered for that hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedRecord {
    pub hour: NaiveDateTime,

    pub cumulative_mean: f64,

    /// Reconstructed average radiation during the hour (0 for the first record).
    pub original: f64,
}

/// Output of the series generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub samples: Vec<Sample>,

    pub hourly: Vec<HourlyRecord>,
}
