use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Series generation parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Number of simulated days.
    pub days: usize,
    /// Number of samples per hour.
    pub samples_per_hour: usize,
    /// Peak radiation of the clear-sky curve (W/m²).
    pub scaling_factor: f64,

    /// Standard deviation of the daytime noise (W/m²).
    #[serde(default = "default_noise_std_dev")]
    pub noise_std_dev: f64,

    /// Timestamp of the first sample.
    #[serde(default = "default_start")]
    pub start: NaiveDateTime,

    /// Seed of the random number generator (random if absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Chart output parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Chart width in pixels.
    #[serde(default = "default_plot_width")]
    pub plot_width: u32,
    /// Chart height in pixels.
    #[serde(default = "default_plot_height")]
    pub plot_height: u32,
}

/// Run configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub series: SeriesConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.series.validate()?;

        check_num(self.output.plot_width, 100..=10_000).context("invalid plot width")?;
        check_num(self.output.plot_height, 100..=10_000).context("invalid plot height")?;

        Ok(())
    }
}

impl SeriesConfig {
    /// Series configuration with default noise and start time.
    pub fn new(days: usize, samples_per_hour: usize, scaling_factor: f64) -> Self {
        Self {
            days,
            samples_per_hour,
            scaling_factor,
            noise_std_dev: default_noise_std_dev(),
            start: default_start(),
            seed: None,
        }
    }

    /// Check that every parameter describes a well-formed series.
    pub fn validate(&self) -> Result<()> {
        check_num(self.days, 1..=3650).context("invalid number of days")?;
        check_num(self.samples_per_hour, 1..=3600).context("invalid number of samples per hour")?;

        check_finite(self.scaling_factor).context("invalid scaling factor")?;
        if self.scaling_factor <= 0.0 {
            bail!(
                "invalid scaling factor: must be positive, but is {}",
                self.scaling_factor
            );
        }

        check_finite(self.noise_std_dev).context("invalid noise standard deviation")?;
        check_num(self.noise_std_dev, 0.0..).context("invalid noise standard deviation")?;

        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot_width: default_plot_width(),
            plot_height: default_plot_height(),
        }
    }
}

fn default_noise_std_dev() -> f64 {
    10.0
}

fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 15)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn default_plot_width() -> u32 {
    1400
}

fn default_plot_height() -> u32 {
    700
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_finite(num: f64) -> Result<()> {
    if !num.is_finite() {
        bail!("number must be finite, but is {num}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: Config = toml::from_str(
            "[series]\n\
             days = 2\n\
             samples_per_hour = 6\n\
             scaling_factor = 150.0\n",
        )
        .expect("failed to parse config");

        assert_eq!(config.series.days, 2);
        assert_eq!(config.series.noise_std_dev, 10.0);
        assert_eq!(config.series.start, default_start());
        assert_eq!(config.series.seed, None);
        assert_eq!(config.output, OutputConfig::default());
        config.validate().expect("config should be valid");
    }

    #[test]
    fn parses_start_and_seed() {
        let config: Config = toml::from_str(
            "[series]\n\
             days = 1\n\
             samples_per_hour = 4\n\
             scaling_factor = 80.0\n\
             start = \"2024-06-21T00:00:00\"\n\
             seed = 7\n\
             [output]\n\
             plot_width = 800\n",
        )
        .expect("failed to parse config");

        assert_eq!(config.series.start.to_string(), "2024-06-21 00:00:00");
        assert_eq!(config.series.seed, Some(7));
        assert_eq!(config.output.plot_width, 800);
        assert_eq!(config.output.plot_height, 700);
    }

    #[test]
    fn rejects_invalid_series() {
        assert!(SeriesConfig::new(0, 6, 150.0).validate().is_err());
        assert!(SeriesConfig::new(2, 0, 150.0).validate().is_err());
        assert!(SeriesConfig::new(2, 6, 0.0).validate().is_err());
        assert!(SeriesConfig::new(2, 6, f64::NAN).validate().is_err());

        let mut cfg = SeriesConfig::new(2, 6, 150.0);
        cfg.noise_std_dev = -1.0;
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("noise standard deviation"));
    }
}
