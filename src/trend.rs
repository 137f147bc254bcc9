//! # Sea-Level Rise
//!
//! The long-term rate is the slope of a least-squares line through the annual
//! mean sea level. Working on annual means rather than raw hourly samples
//! removes the tide itself and the seasonal cycle, and gives every year the
//! same weight regardless of how complete its record is.

use crate::{Result, TideError, TideSeries};
use chrono::Datelike;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean of all present samples in one calendar year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnnualMean {
    pub year: i32,
    /// Mean level in metres
    pub mean: f64,
    /// Number of present samples behind the mean
    pub count: usize,
}

/// Linear fit of annual mean level against calendar year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrendFit {
    /// Rate of rise in millimetres per year
    pub rate_mm_per_year: f64,
    /// Slope in metres per year
    pub slope: f64,
    /// Level at year zero, metres
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub r_value: f64,
    /// Standard error of the slope, metres per year
    pub std_err: f64,
    /// Number of annual means in the fit
    pub years: usize,
}

/// Annual means in calendar order. Years with no present samples are omitted.
pub fn annual_means(series: &TideSeries) -> Vec<AnnualMean> {
    let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for sample in &series.samples {
        if let Some(v) = sample.value() {
            let entry = by_year.entry(sample.time.year()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    by_year
        .into_iter()
        .map(|(year, (sum, count))| AnnualMean {
            year,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// Sea-level rise rate in mm/year.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tidal_analysis_lib::{trend::sea_level_rise, Sample, TideSeries};
///
/// let series = TideSeries::from_samples(
///     (2000..2010)
///         .map(|y| {
///             let t = NaiveDate::from_ymd_opt(y, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///             Sample::new(t, 0.002 * (y - 2000) as f64)
///         })
///         .collect(),
/// );
///
/// let rate = sea_level_rise(&series).unwrap();
/// assert!((rate - 2.0).abs() < 1e-9);
/// ```
pub fn sea_level_rise(series: &TideSeries) -> Result<f64> {
    Ok(fit_sea_level_trend(series)?.rate_mm_per_year)
}

/// Full trend fit with diagnostics.
pub fn fit_sea_level_trend(series: &TideSeries) -> Result<TrendFit> {
    let means = annual_means(series);
    if means.len() < 2 {
        return Err(TideError::InsufficientData(format!(
            "need at least 2 annual means for a trend, found {}",
            means.len()
        )));
    }

    let years: Vec<f64> = means.iter().map(|m| m.year as f64).collect();
    let levels: Vec<f64> = means.iter().map(|m| m.mean).collect();
    let (slope, intercept, r_value, std_err) = linear_regression(&years, &levels);

    debug!(
        "trend over {} years: slope {slope:.6} m/yr, r {r_value:.3}",
        means.len()
    );

    Ok(TrendFit {
        rate_mm_per_year: slope * 1000.0,
        slope,
        intercept,
        r_value,
        std_err,
        years: means.len(),
    })
}

/// Ordinary least squares `y = slope * x + intercept`.
///
/// Returns `(slope, intercept, r, standard error of slope)`. Expects at least
/// two distinct `x` values.
fn linear_regression(x: &[f64], y: &[f64]) -> (f64, f64, f64, f64) {
    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    // Centred sums keep precision with calendar years as x
    let sxx = x.iter().map(|xi| (xi - x_mean).powi(2)).sum::<f64>();
    let syy = y.iter().map(|yi| (yi - y_mean).powi(2)).sum::<f64>();
    let sxy = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let r_value = if syy > 0.0 {
        sxy / (sxx * syy).sqrt()
    } else {
        0.0
    };

    let std_err = if x.len() > 2 {
        let ss_res = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (yi - (slope * xi + intercept)).powi(2))
            .sum::<f64>();
        (ss_res / (n - 2.0) / sxx).sqrt()
    } else {
        0.0
    };

    (slope, intercept, r_value, std_err)
}
