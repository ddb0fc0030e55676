use crate::config::Config;
use crate::generator::Generator;
use crate::model::{HourlyRecord, ReconstructedRecord, Sample};
use crate::reconstruct::reconstruct;
use crate::render::render;
use crate::stats::analyze;
use anyhow::{Context, Result};
use glob::glob;
use rmp_serde::{decode, encode};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Every table produced by one pass of the pipeline.
pub struct Tables {
    pub samples: Vec<Sample>,
    pub hourly: Vec<HourlyRecord>,
    pub reconstructed: Vec<ReconstructedRecord>,
}

/// Generate the series and reconstruct its hourly values, without side effects.
pub fn pipeline(cfg: &Config) -> Result<Tables> {
    let mut generator =
        Generator::new(cfg.series.clone()).context("failed to construct generator")?;
    let series = generator.generate().context("failed to generate series")?;
    let reconstructed = reconstruct(&series.hourly).context("failed to reconstruct values")?;
    Ok(Tables {
        samples: series.samples,
        hourly: series.hourly,
        reconstructed,
    })
}

pub struct Manager {
    run_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(run_dir: P) -> Result<Self> {
        let run_dir = run_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(run_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { run_dir, cfg })
    }

    pub fn generate(&self) -> Result<()> {
        let mut generator =
            Generator::new(self.cfg.series.clone()).context("failed to construct generator")?;
        let series = generator.generate().context("failed to generate series")?;

        write_table(self.samples_file(), &series.samples).context("failed to save samples")?;
        write_table(self.hourly_file(), &series.hourly).context("failed to save hourly")?;

        Ok(())
    }

    pub fn reconstruct(&self) -> Result<()> {
        let hourly: Vec<HourlyRecord> =
            read_table(self.hourly_file()).context("failed to load hourly")?;

        let reconstructed = reconstruct(&hourly).context("failed to reconstruct values")?;

        write_table(self.reconstructed_file(), &reconstructed)
            .context("failed to save reconstructed")?;

        Ok(())
    }

    pub fn render(&self) -> Result<()> {
        let samples: Vec<Sample> =
            read_table(self.samples_file()).context("failed to load samples")?;
        let hourly: Vec<HourlyRecord> =
            read_table(self.hourly_file()).context("failed to load hourly")?;
        let reconstructed: Vec<ReconstructedRecord> =
            read_table(self.reconstructed_file()).context("failed to load reconstructed")?;

        self.render_chart(&samples, &hourly, &reconstructed)
    }

    pub fn analyze(&self) -> Result<()> {
        let samples: Vec<Sample> =
            read_table(self.samples_file()).context("failed to load samples")?;
        let reconstructed: Vec<ReconstructedRecord> =
            read_table(self.reconstructed_file()).context("failed to load reconstructed")?;

        let report = analyze(&samples, &reconstructed).context("failed to analyze")?;
        log::info!("{report:#?}");

        let file = self.report_file();
        let file_handle =
            File::create(&file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file_handle);
        encode::write(&mut writer, &report).context("failed to serialize report")?;
        writer.flush().context("failed to flush writer stream")?;
        log::info!("saved {file:?}");

        Ok(())
    }

    pub fn run(&self) -> Result<()> {
        let tables = pipeline(&self.cfg)?;

        write_table(self.samples_file(), &tables.samples).context("failed to save samples")?;
        write_table(self.hourly_file(), &tables.hourly).context("failed to save hourly")?;
        write_table(self.reconstructed_file(), &tables.reconstructed)
            .context("failed to save reconstructed")?;

        self.render_chart(&tables.samples, &tables.hourly, &tables.reconstructed)
    }

    pub fn clean(&self) -> Result<()> {
        for ext in ["msgpack", "svg"] {
            let pattern = self.run_dir.join(format!("*.{ext}"));
            let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
            for file in glob(pattern)
                .context("failed to glob output files")?
                .filter_map(Result::ok)
            {
                fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
                log::info!("removed {file:?}");
            }
        }
        Ok(())
    }

    fn render_chart(
        &self,
        samples: &[Sample],
        hourly: &[HourlyRecord],
        reconstructed: &[ReconstructedRecord],
    ) -> Result<()> {
        let size = (self.cfg.output.plot_width, self.cfg.output.plot_height);
        render(self.chart_file(), size, samples, hourly, reconstructed)
            .context("failed to render chart")
    }

    fn samples_file(&self) -> PathBuf {
        self.run_dir.join("samples.msgpack")
    }

    fn hourly_file(&self) -> PathBuf {
        self.run_dir.join("hourly.msgpack")
    }

    fn reconstructed_file(&self) -> PathBuf {
        self.run_dir.join("reconstructed.msgpack")
    }

    fn report_file(&self) -> PathBuf {
        self.run_dir.join("report.msgpack")
    }

    fn chart_file(&self) -> PathBuf {
        self.run_dir.join("chart.svg")
    }
}

fn write_table<P: AsRef<Path>, T: Serialize>(file: P, table: &[T]) -> Result<()> {
    let file = file.as_ref();
    let file_handle = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file_handle);
    encode::write(&mut writer, &table).context("failed to serialize table")?;
    writer.flush().context("failed to flush writer stream")?;
    log::info!("saved {} rows to {file:?}", table.len());
    Ok(())
}

fn read_table<P: AsRef<Path>, T: DeserializeOwned>(file: P) -> Result<Vec<T>> {
    let file = file.as_ref();
    let file_handle = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file_handle);
    let table = decode::from_read(&mut reader).context("failed to deserialize table")?;
    Ok(table)
}
