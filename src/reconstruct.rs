use crate::model::{HourlyRecord, ReconstructedRecord};
use anyhow::{Result, bail};
use chrono::NaiveDateTime;

/// Recover the average radiation of every hour from consecutive cumulative means.
///
/// With `t` the hours elapsed since the first record, the integral up to `t`
/// is `t * y`, so the average between two records is
/// `(t2 * y2 - t1 * y1) / (t2 - t1)`. The first record has no predecessor
/// and gets `original = 0`.
///
/// # Errors
/// Returns an error if two consecutive records share the same hour.
pub fn reconstruct(hourly: &[HourlyRecord]) -> Result<Vec<ReconstructedRecord>> {
    let Some(first) = hourly.first() else {
        return Ok(Vec::new());
    };

    let mut reconstructed = Vec::with_capacity(hourly.len());
    reconstructed.push(ReconstructedRecord {
        hour: first.hour,
        cumulative_mean: first.cumulative_mean,
        original: 0.0,
    });

    for (i_rec, pair) in hourly.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);

        let t1 = elapsed_hours(first.hour, prev.hour);
        let t2 = elapsed_hours(first.hour, curr.hour);
        if t2 == t1 {
            bail!(
                "records {} and {} share the hour {}",
                i_rec,
                i_rec + 1,
                curr.hour
            );
        }

        let (y1, y2) = (prev.cumulative_mean, curr.cumulative_mean);
        reconstructed.push(ReconstructedRecord {
            hour: curr.hour,
            cumulative_mean: curr.cumulative_mean,
            original: (t2 * y2 - t1 * y1) / (t2 - t1),
        });
    }

    log::info!("reconstructed {} hourly values", reconstructed.len());

    Ok(reconstructed)
}

fn elapsed_hours(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use chrono::{NaiveDate, TimeDelta};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 15)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("invalid start")
    }

    #[test]
    fn empty_input() {
        let reconstructed = reconstruct(&[]).expect("failed to reconstruct");
        assert!(reconstructed.is_empty());
    }

    #[test]
    fn recovers_constant_hourly_values() {
        // Value of the hour ending at `t = h`.
        let values = [0.0, 12.0, 80.0, 145.5, 60.0, 0.0, 3.25];

        let mut area = 0.0;
        let hourly: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(h, &val)| {
                area += val;
                HourlyRecord {
                    hour: start() + TimeDelta::hours(h as i64),
                    cumulative_mean: if h == 0 { 0.0 } else { area / h as f64 },
                }
            })
            .collect();

        let reconstructed = reconstruct(&hourly).expect("failed to reconstruct");

        assert_eq!(reconstructed.len(), hourly.len());
        assert_eq!(reconstructed[0].original, 0.0);
        for (rec, &val) in reconstructed.iter().zip(&values).skip(1) {
            assert!((rec.original - val).abs() < 1e-9, "{} != {val}", rec.original);
        }
        for (rec, hr) in reconstructed.iter().zip(&hourly) {
            assert_eq!(rec.hour, hr.hour);
            assert_eq!(rec.cumulative_mean, hr.cumulative_mean);
        }
    }

    #[test]
    fn handles_gaps_between_hours() {
        // Constant 50 W/m² everywhere, with the 2nd hour missing.
        let hourly: Vec<_> = [0, 1, 3, 4]
            .iter()
            .map(|&h| HourlyRecord {
                hour: start() + TimeDelta::hours(h),
                cumulative_mean: 50.0,
            })
            .collect();

        let reconstructed = reconstruct(&hourly).expect("failed to reconstruct");
        for rec in &reconstructed[1..] {
            assert!((rec.original - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_duplicate_hours() {
        let hourly = vec![
            HourlyRecord {
                hour: start(),
                cumulative_mean: 0.0,
            },
            HourlyRecord {
                hour: start() + TimeDelta::hours(1),
                cumulative_mean: 10.0,
            },
            HourlyRecord {
                hour: start() + TimeDelta::hours(1),
                cumulative_mean: 12.0,
            },
        ];

        let err = reconstruct(&hourly).unwrap_err();
        assert!(format!("{err:#}").contains("records 1 and 2"));
    }

    #[test]
    fn two_day_example() {
        let series = generate(2, 6, 150.0, Some(4)).expect("failed to generate series");
        let reconstructed = reconstruct(&series.hourly).expect("failed to reconstruct");

        assert_eq!(reconstructed.len(), series.hourly.len());
        assert_eq!(reconstructed[0].original, 0.0);
        assert!(reconstructed[1].original >= 0.0);
    }
}
