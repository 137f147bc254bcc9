//! # Contiguous Run Detection
//!
//! Harmonic analysis wants evenly sampled input with no holes. Tide-gauge
//! records are full of them: instrument outages, flagged values, files that
//! overlap or leave a few days uncovered. This module finds the longest stretch
//! of present samples spaced one nominal interval apart.
//!
//! A block boundary opens:
//! - at the start of the series
//! - at any missing sample
//! - whenever two present samples are not `interval ± tolerance` apart
//!   (this includes duplicate timestamps)

use crate::TideSeries;
use chrono::{Duration, NaiveDateTime};
use log::debug;
use serde::Serialize;

/// A maximal run of present, regularly spaced samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ContiguousBlock {
    /// Index of the first sample in the source series
    pub start: usize,
    /// Number of samples in the run
    pub len: usize,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

/// Longest hourly run with a one minute tolerance.
pub fn get_longest_contiguous_data(series: &TideSeries) -> TideSeries {
    longest_contiguous_run(series, Duration::hours(1), Duration::minutes(1))
}

/// Longest run for an arbitrary sampling interval.
///
/// Ties go to the earliest block. Returns an empty series when there is no
/// present sample at all.
///
/// # Example
/// ```
/// use chrono::{Duration, NaiveDate};
/// use tidal_analysis_lib::{contiguity::longest_contiguous_run, Sample, TideSeries};
///
/// let t0 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let series = TideSeries::from_samples(vec![
///     Sample::new(t0, 1.0),
///     Sample::missing(t0 + Duration::hours(1)),
///     Sample::new(t0 + Duration::hours(2), 1.0),
///     Sample::new(t0 + Duration::hours(3), 1.0),
/// ]);
///
/// let run = longest_contiguous_run(&series, Duration::hours(1), Duration::minutes(1));
/// assert_eq!(run.len(), 2);
/// assert_eq!(run.first_time(), Some(t0 + Duration::hours(2)));
/// ```
pub fn longest_contiguous_run(
    series: &TideSeries,
    interval: Duration,
    tolerance: Duration,
) -> TideSeries {
    let blocks = contiguous_blocks(series, interval, tolerance);

    let Some(best) = blocks
        .iter()
        .fold(None::<&ContiguousBlock>, |best, block| match best {
            Some(b) if b.len >= block.len => Some(b),
            _ => Some(block),
        })
    else {
        debug!("no present samples, no contiguous run");
        return series.with_samples(Vec::new());
    };

    debug!(
        "longest run: {} samples from {} to {} ({} blocks total)",
        best.len,
        best.first,
        best.last,
        blocks.len()
    );

    let samples = series.samples[best.start..best.start + best.len].to_vec();
    series.with_samples(samples)
}

/// Partition the present samples of a sorted series into contiguous blocks,
/// in timestamp order.
pub fn contiguous_blocks(
    series: &TideSeries,
    interval: Duration,
    tolerance: Duration,
) -> Vec<ContiguousBlock> {
    let samples = &series.samples;
    let mut blocks = Vec::new();
    // (first index, last index) of the open block
    let mut open: Option<(usize, usize)> = None;

    for (i, sample) in samples.iter().enumerate() {
        if sample.is_missing() {
            if let Some(block) = open.take() {
                blocks.push(block);
            }
            continue;
        }

        open = match open {
            Some((start, end)) if regular_step(samples[end].time, sample.time, interval, tolerance) => {
                Some((start, i))
            }
            Some(block) => {
                blocks.push(block);
                Some((i, i))
            }
            None => Some((i, i)),
        };
    }
    if let Some(block) = open {
        blocks.push(block);
    }

    blocks
        .into_iter()
        .map(|(start, end)| ContiguousBlock {
            start,
            len: end - start + 1,
            first: samples[start].time,
            last: samples[end].time,
        })
        .collect()
}

fn regular_step(
    prev: NaiveDateTime,
    next: NaiveDateTime,
    interval: Duration,
    tolerance: Duration,
) -> bool {
    let step = next - prev;
    step >= interval - tolerance && step <= interval + tolerance
}
