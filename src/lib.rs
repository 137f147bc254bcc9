//! # Tidal Analysis Core Library
//!
//! This library provides the data structures and analytical routines for working
//! with hourly tide-gauge records. Everything here operates on an in-memory
//! [`TideSeries`]; reading station files lives in [`tide_data`] and never leaks
//! into the analytical modules.
//!
//! ## Analytical Products
//!
//! - **Mean removal** ([`series`]): a calendar year or a date range with its own
//!   mean subtracted, so different stations can be compared on a common datum
//! - **Merging** ([`series::join_data`]): several station files combined into one
//!   chronological series
//! - **Contiguity** ([`contiguity`]): the longest evenly-sampled, gap-free window
//! - **Sea-level rise** ([`trend`]): linear trend on annual means, in mm/year
//! - **Harmonic analysis** ([`harmonic`]): amplitude and phase per tidal constituent
//!
//! ## Data Flow
//! 1. **Ingest**: station text files → [`TideSeries`] with the `-99.0` sentinel
//!    already turned into a missing value
//! 2. **Prepare**: merge files, optionally cut a year/range or the longest
//!    contiguous run
//! 3. **Analyse**: trend and/or harmonic decomposition, each independent
//!
//! Every operation takes its input by reference and returns a fresh series or
//! result; nothing is mutated in place and there is no global state.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// Module declarations
pub mod config;
pub mod contiguity;
pub mod error;
pub mod harmonic;
pub mod report;
pub mod series;
pub mod synthetic;
pub mod tide_data;
pub mod trend;

#[cfg(test)]
mod tests;

pub use error::{Result, TideError};

/// Name of the only quantity column the analytical core understands.
pub const SEA_LEVEL: &str = "Sea Level";

/// A single tide-gauge observation.
///
/// `level` is `None` for a missing observation. Ingestion maps the raw
/// `-99.0` sentinel to `None`, so analytical code never compares against it.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tidal_analysis_lib::Sample;
///
/// let t = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let present = Sample::new(t, 3.21);
/// let gap = Sample::missing(t);
///
/// assert_eq!(present.value(), Some(3.21));
/// assert!(gap.is_missing());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation time, second resolution, interpreted as UTC
    pub time: NaiveDateTime,
    /// Sea level in metres, `None` when missing
    pub level: Option<f64>,
}

impl Sample {
    pub fn new(time: NaiveDateTime, level: f64) -> Self {
        Self {
            time,
            level: Some(level),
        }
    }

    pub fn missing(time: NaiveDateTime) -> Self {
        Self { time, level: None }
    }

    /// Usable value of this sample. Non-finite levels count as missing.
    pub fn value(&self) -> Option<f64> {
        self.level.filter(|v| v.is_finite())
    }

    pub fn is_missing(&self) -> bool {
        self.value().is_none()
    }
}

/// An ordered series of tide-gauge samples for one quantity.
///
/// Series produced by this crate are always sorted by timestamp ascending.
/// Duplicate timestamps are allowed and kept.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tidal_analysis_lib::{Sample, TideSeries};
///
/// let t0 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let t1 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(1, 0, 0).unwrap();
///
/// let series = TideSeries::from_samples(vec![Sample::new(t1, 2.0), Sample::missing(t0)]);
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.samples[0].time, t0);
/// assert_eq!(series.missing_count(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideSeries {
    /// Quantity column name, [`SEA_LEVEL`] for ingested data
    pub quantity: String,
    /// Observations in timestamp order
    pub samples: Vec<Sample>,
}

impl TideSeries {
    /// Build a sea-level series, sorting the samples by timestamp.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let mut series = Self {
            quantity: SEA_LEVEL.to_string(),
            samples,
        };
        sort_samples(&mut series.samples);
        series
    }

    pub fn empty() -> Self {
        Self {
            quantity: SEA_LEVEL.to_string(),
            samples: Vec::new(),
        }
    }

    /// New series with the same quantity and the given samples.
    pub(crate) fn with_samples(&self, samples: Vec<Sample>) -> Self {
        Self {
            quantity: self.quantity.clone(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.samples.windows(2).all(|w| w[0].time <= w[1].time)
    }

    pub fn missing_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_missing()).count()
    }

    pub fn first_time(&self) -> Option<NaiveDateTime> {
        self.samples.first().map(|s| s.time)
    }

    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.samples.last().map(|s| s.time)
    }

    /// Present values in timestamp order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().filter_map(Sample::value)
    }
}

/// Sort by timestamp, then by level (missing first), so merges are
/// independent of argument order.
pub(crate) fn sort_samples(samples: &mut [Sample]) {
    samples.sort_by(|a, b| {
        a.time.cmp(&b.time).then_with(|| match (a.level, b.level) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => x.total_cmp(&y),
        })
    });
}
