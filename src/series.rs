//! # Sub-series Extraction and Merging
//!
//! Mean removal puts a year or a date range of one station on a zero datum so
//! it can be compared against other stations or other years. Merging combines
//! several station files (typically one file per year) into a single
//! chronological series.
//!
//! Both extraction functions follow the same convention: a selection that
//! matches nothing returns an empty series and logs a notice. Callers check
//! `is_empty()`; only a structurally broken input is an `Err`.

use crate::{sort_samples, Result, Sample, TideError, TideSeries, SEA_LEVEL};
use chrono::{Datelike, NaiveDateTime};
use log::{debug, info};

/// Select every sample in calendar `year` and subtract the mean of the
/// selection's present values.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tidal_analysis_lib::{series::extract_single_year_remove_mean, Sample, TideSeries};
///
/// let at = |y, h| NaiveDate::from_ymd_opt(y, 6, 1).unwrap().and_hms_opt(h, 0, 0).unwrap();
/// let series = TideSeries::from_samples(vec![
///     Sample::new(at(2019, 0), 9.0),
///     Sample::new(at(2020, 0), 1.0),
///     Sample::new(at(2020, 1), 3.0),
/// ]);
///
/// let year = extract_single_year_remove_mean(2020, &series).unwrap();
/// assert_eq!(year.len(), 2);
/// assert_eq!(year.samples[0].level, Some(-1.0));
/// assert_eq!(year.samples[1].level, Some(1.0));
/// ```
pub fn extract_single_year_remove_mean(year: i32, series: &TideSeries) -> Result<TideSeries> {
    check_structure(series)?;

    let selected: Vec<Sample> = series
        .samples
        .iter()
        .filter(|s| s.time.year() == year)
        .copied()
        .collect();

    if selected.is_empty() {
        info!("no samples for year {year}, returning empty series");
        return Ok(series.with_samples(Vec::new()));
    }

    Ok(series.with_samples(remove_mean(selected)))
}

/// Select every sample with `start <= time <= end` and subtract the mean of
/// the selection's present values.
///
/// Non-finite levels in the selection are turned into missing values.
pub fn extract_section_remove_mean(
    start: NaiveDateTime,
    end: NaiveDateTime,
    series: &TideSeries,
) -> Result<TideSeries> {
    check_structure(series)?;

    let selected: Vec<Sample> = series
        .samples
        .iter()
        .filter(|s| s.time >= start && s.time <= end)
        .copied()
        .collect();

    if selected.is_empty() {
        info!("no samples between {start} and {end}, returning empty series");
        return Ok(series.with_samples(Vec::new()));
    }

    Ok(series.with_samples(remove_mean(selected)))
}

/// Merge two series into one sorted by timestamp.
///
/// Nothing is deduplicated or filled. The result does not depend on argument
/// order.
pub fn join_data(first: &TideSeries, second: &TideSeries) -> TideSeries {
    let mut samples = Vec::with_capacity(first.len() + second.len());
    samples.extend_from_slice(&first.samples);
    samples.extend_from_slice(&second.samples);
    sort_samples(&mut samples);

    debug!(
        "joined {} + {} samples into {}",
        first.len(),
        second.len(),
        samples.len()
    );

    first.with_samples(samples)
}

/// Merge any number of series, e.g. one per station file.
pub fn join_all<'a, I>(series: I) -> TideSeries
where
    I: IntoIterator<Item = &'a TideSeries>,
{
    series
        .into_iter()
        .fold(TideSeries::empty(), |acc, next| join_data(&acc, next))
}

/// Arithmetic mean of the present values, `None` if there are none.
pub fn mean_level(samples: &[Sample]) -> Option<f64> {
    let (sum, count) = samples
        .iter()
        .filter_map(Sample::value)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

fn remove_mean(selected: Vec<Sample>) -> Vec<Sample> {
    let mean = mean_level(&selected);

    selected
        .into_iter()
        .map(|s| Sample {
            time: s.time,
            level: match (s.value(), mean) {
                (Some(v), Some(m)) => Some(v - m),
                _ => None,
            },
        })
        .collect()
}

fn check_structure(series: &TideSeries) -> Result<()> {
    if series.quantity != SEA_LEVEL {
        return Err(TideError::StructuralInvalid(format!(
            "expected quantity '{SEA_LEVEL}', found '{}'",
            series.quantity
        )));
    }
    if !series.is_sorted() {
        return Err(TideError::StructuralInvalid(
            "samples are not in timestamp order".to_string(),
        ));
    }
    Ok(())
}
