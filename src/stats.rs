use crate::model::{ReconstructedRecord, Sample};
use anyhow::{Context, Result};
use chrono::{DurationRound, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
    max_abs: f64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub max_abs: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
            max_abs: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;

        self.max_abs = self.max_abs.max(val.abs());
    }

    pub fn mean(&self) -> f64 {
        if self.n_vals > 0 {
            self.mean
        } else {
            f64::NAN
        }
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: self.mean(),
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
            max_abs: self.max_abs,
        }
    }
}

/// Residual between reconstructed values and the mean radiation of each hour.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ResidualReport {
    /// Number of compared hours.
    pub n_hours: usize,
    /// Residual statistics (`original - bucket mean`).
    pub residual: AccumulatorReport,
}

/// Compare every reconstructed value (except the first) with the mean
/// radiation of the samples falling in the same clock hour.
pub fn analyze(samples: &[Sample], reconstructed: &[ReconstructedRecord]) -> Result<ResidualReport> {
    let mut buckets: BTreeMap<NaiveDateTime, Accumulator> = BTreeMap::new();
    for smp in samples {
        let hour = smp
            .time
            .duration_trunc(TimeDelta::hours(1))
            .with_context(|| format!("failed to truncate {} to the hour", smp.time))?;
        buckets
            .entry(hour)
            .or_insert_with(Accumulator::new)
            .add(smp.radiation);
    }

    let mut residual = Accumulator::new();
    for rec in reconstructed.iter().skip(1) {
        match buckets.get(&rec.hour) {
            Some(bucket) => residual.add(rec.original - bucket.mean()),
            None => log::warn!("no samples fall in the hour {}", rec.hour),
        }
    }

    let residual = residual.report();
    Ok(ResidualReport {
        n_hours: residual.n_vals,
        residual,
    })
}
