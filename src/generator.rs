use crate::config::SeriesConfig;
use crate::model::{HourlyRecord, Sample, Series};
use anyhow::{Context, Result};
use chrono::{DurationRound, TimeDelta};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Normal;
use std::f64::consts::PI;

const HOURS_PER_DAY: usize = 24;
const NANOS_PER_HOUR: i64 = 3_600_000_000_000;

/// Synthetic radiation series generator.
///
/// Holds the configuration and the random number generator used for the noise.
pub struct Generator {
    cfg: SeriesConfig,
    rng: ChaCha12Rng,
}

impl Generator {
    /// Create a new `Generator`, seeded from `cfg.seed` or from the OS.
    pub fn new(cfg: SeriesConfig) -> Result<Self> {
        cfg.validate().context("invalid series configuration")?;

        let rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        Ok(Self { cfg, rng })
    }

    /// Generate the noisy series and its hourly published values.
    pub fn generate(&mut self) -> Result<Series> {
        let sph = self.cfg.samples_per_hour;
        let n_samples = self.cfg.days * HOURS_PER_DAY * sph + 1;

        let radiation = self
            .noisy_radiation(n_samples)
            .context("failed to add noise")?;

        let time_diff = 1.0 / sph as f64;
        let mut samples = Vec::with_capacity(n_samples);
        let mut cumulative_area = 0.0;
        for (i_smp, &radiation) in radiation.iter().enumerate() {
            cumulative_area += radiation * time_diff;
            samples.push(Sample {
                time: self.timestamp(i_smp),
                radiation,
                time_diff,
                cumulative_area,
                cumulative_mean: cumulative_area / ((i_smp + 1) as f64 * time_diff),
            });
        }

        let hourly = hourly_records(&samples).context("failed to aggregate hourly records")?;

        log::info!(
            "generated {} samples and {} hourly records",
            samples.len(),
            hourly.len()
        );

        Ok(Series { samples, hourly })
    }

    fn noisy_radiation(&mut self, n_samples: usize) -> Result<Vec<f64>> {
        let noise_dist = Normal::new(0.0, self.cfg.noise_std_dev)?;
        let sph = self.cfg.samples_per_hour as f64;

        let radiation = (0..n_samples)
            .map(|i_smp| {
                let t = i_smp as f64 / sph;
                let clear = clear_sky(t) * self.cfg.scaling_factor;
                // Noise only during daytime.
                if clear > 0.0 {
                    (clear + noise_dist.sample(&mut self.rng)).max(0.0)
                } else {
                    clear
                }
            })
            .collect();

        Ok(radiation)
    }

    fn timestamp(&self, i_smp: usize) -> chrono::NaiveDateTime {
        let sph = self.cfg.samples_per_hour;
        let hours = (i_smp / sph) as i64;
        let rem = (i_smp % sph) as i64;
        self.cfg.start
            + TimeDelta::hours(hours)
            + TimeDelta::nanoseconds(rem * NANOS_PER_HOUR / sph as i64)
    }
}

/// Generate a series with default noise and start time.
pub fn generate(
    days: usize,
    samples_per_hour: usize,
    scaling_factor: f64,
    seed: Option<u64>,
) -> Result<Series> {
    let mut cfg = SeriesConfig::new(days, samples_per_hour, scaling_factor);
    cfg.seed = seed;
    Generator::new(cfg)?.generate()
}

/// Diurnal cycle in [-1, 1], peaking at noon.
fn clear_sky(t: f64) -> f64 {
    ((2.0 * PI / HOURS_PER_DAY as f64) * (t % HOURS_PER_DAY as f64) - PI / 2.0)
        .sin()
        .max(0.0)
}

/// Keep the cumulative mean of the last sample of every clock hour.
fn hourly_records(samples: &[Sample]) -> Result<Vec<HourlyRecord>> {
    let mut hourly: Vec<HourlyRecord> = Vec::new();
    for smp in samples {
        let hour = smp
            .time
            .duration_trunc(TimeDelta::hours(1))
            .with_context(|| format!("failed to truncate {} to the hour", smp.time))?;
        match hourly.last_mut() {
            Some(last) if last.hour == hour => last.cumulative_mean = smp.cumulative_mean,
            _ => hourly.push(HourlyRecord {
                hour,
                cumulative_mean: smp.cumulative_mean,
            }),
        }
    }
    Ok(hourly)
}
