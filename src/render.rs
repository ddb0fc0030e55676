use crate::model::{HourlyRecord, ReconstructedRecord, Sample};
use anyhow::{Context, Result, bail};
use chrono::{NaiveDateTime, TimeDelta};
use plotters::prelude::*;
use std::path::Path;

const SAMPLE_COLOR: RGBColor = RGBColor(128, 128, 128);
const PUBLISHED_COLOR: RGBColor = RGBColor(0, 0, 139);
const ORIGINAL_COLOR: RGBColor = RGBColor(255, 165, 0);

/// Draw the samples, the hourly published means and the reconstructed values
/// into a single SVG chart.
pub fn render<P: AsRef<Path>>(
    file: P,
    size: (u32, u32),
    samples: &[Sample],
    hourly: &[HourlyRecord],
    reconstructed: &[ReconstructedRecord],
) -> Result<()> {
    let file = file.as_ref();
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        bail!("no samples to render");
    };

    let start = first.time;
    let hours = |time: NaiveDateTime| (time - start).num_milliseconds() as f64 / 3_600_000.0;

    let x_max = hours(last.time).max(1.0);
    let vals = samples
        .iter()
        .flat_map(|smp| [smp.radiation, smp.cumulative_mean])
        .chain(hourly.iter().map(|rec| rec.cumulative_mean))
        .chain(reconstructed.iter().map(|rec| rec.original))
        .filter(|val| val.is_finite());
    let (y_min, y_max) = vals.fold((0.0_f64, 1.0_f64), |(lo, hi), val| {
        (lo.min(val), hi.max(val))
    });
    let margin = 0.05 * (y_max - y_min);

    let root = SVGBackend::new(file, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Time averaging and hourly value reconstruction",
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, (y_min - margin)..(y_max + margin))?;

    let x_label = |x: &f64| {
        let time = start + TimeDelta::milliseconds((x * 3_600_000.0).round() as i64);
        time.format("%m-%d %H:%M").to_string()
    };
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Radiation in W/m²")
        .x_labels(12)
        .x_label_formatter(&x_label)
        .draw()?;

    chart
        .draw_series(
            samples
                .iter()
                .map(|smp| Circle::new((hours(smp.time), smp.radiation), 2, SAMPLE_COLOR.filled())),
        )?
        .label("Fictitious radiation data (noisy)")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, SAMPLE_COLOR.filled()));

    chart
        .draw_series(samples.iter().map(|smp| {
            Circle::new((hours(smp.time), smp.cumulative_mean), 1, BLUE.filled())
        }))?
        .label("Time average for each step")
        .legend(|(x, y)| Circle::new((x + 10, y), 2, BLUE.filled()));

    chart
        .draw_series(
            LineSeries::new(
                hourly.iter().map(|rec| (hours(rec.hour), rec.cumulative_mean)),
                PUBLISHED_COLOR.stroke_width(2),
            )
            .point_size(3),
        )?
        .label("Published value (last of hour)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PUBLISHED_COLOR));

    chart
        .draw_series(
            LineSeries::new(
                reconstructed.iter().map(|rec| (hours(rec.hour), rec.original)),
                ORIGINAL_COLOR.stroke_width(2),
            )
            .point_size(3),
        )?
        .label("Reconstructed hourly value")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORIGINAL_COLOR));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {file:?}"))?;

    log::info!("rendered {file:?}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::reconstruct::reconstruct;
    use std::{env, fs};

    #[test]
    fn writes_svg_chart() {
        let series = generate(1, 6, 150.0, Some(6)).expect("failed to generate series");
        let reconstructed = reconstruct(&series.hourly).expect("failed to reconstruct");

        let file = env::temp_dir().join("timeavg_render_test.svg");
        render(
            &file,
            (800, 400),
            &series.samples,
            &series.hourly,
            &reconstructed,
        )
        .expect("failed to render chart");

        let contents = fs::read_to_string(&file).expect("failed to read chart");
        assert!(contents.starts_with("<svg"));
        assert!(contents.contains("Reconstructed hourly value"));
        fs::remove_file(&file).ok();
    }

    #[test]
    fn rejects_empty_samples() {
        let file = env::temp_dir().join("timeavg_render_empty.svg");
        assert!(render(&file, (800, 400), &[], &[], &[]).is_err());
    }
}
