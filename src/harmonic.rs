//! # Harmonic Tidal Analysis
//!
//! The observed level is modelled as a mean plus a sum of constituents, each a
//! cosine at a fixed astronomical frequency:
//!
//! h(t) = z₀ + Σᵢ Aᵢ cos(ωᵢ t − φᵢ)
//!
//! where `t` is seconds since a reference epoch. Amplitude `Aᵢ` comes back in
//! the series' unit (metres), phase `φᵢ` in degrees relative to that epoch.
//!
//! The decomposition itself sits behind [`HarmonicSolver`], so the wrapper can
//! be driven by a deterministic stand-in during testing. [`LeastSquaresSolver`]
//! is the default implementation. No nodal corrections or equilibrium
//! arguments are applied, so phases are local to the epoch rather than
//! Greenwich phases.
//!
//! Missing samples are dropped before the solver runs. The fit does not need
//! evenly spaced input, but a gap-free window from
//! [`contiguity`](crate::contiguity) gives the best conditioned system.

use crate::{Result, TideError, TideSeries};
use chrono::{DateTime, TimeZone};
use log::debug;
use nalgebra::{DMatrix, DVector, SVD};
use serde::Serialize;
use std::f64::consts::TAU;

/// A named tidal constituent with its angular speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Constituent {
    /// Conventional name (e.g. "M2", "K1")
    pub name: &'static str,
    /// Angular speed in degrees per mean solar hour
    pub speed: f64,
}

/// Singular values below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Standard constituents, speeds in degrees/hour.
const CATALOGUE: &[Constituent] = &[
    Constituent { name: "M2", speed: 28.984_104_2 },
    Constituent { name: "S2", speed: 30.000_000_0 },
    Constituent { name: "N2", speed: 28.439_729_5 },
    Constituent { name: "K2", speed: 30.082_137_3 },
    Constituent { name: "K1", speed: 15.041_068_6 },
    Constituent { name: "O1", speed: 13.943_035_6 },
    Constituent { name: "P1", speed: 14.958_931_4 },
    Constituent { name: "Q1", speed: 13.398_660_9 },
    Constituent { name: "2N2", speed: 27.895_354_8 },
    Constituent { name: "MU2", speed: 27.968_208_4 },
    Constituent { name: "NU2", speed: 28.512_583_1 },
    Constituent { name: "L2", speed: 29.528_478_9 },
    Constituent { name: "T2", speed: 29.958_933_3 },
    Constituent { name: "J1", speed: 15.585_443_3 },
    Constituent { name: "M1", speed: 14.496_693_9 },
    Constituent { name: "OO1", speed: 16.139_101_7 },
    Constituent { name: "MF", speed: 1.098_033_1 },
    Constituent { name: "MM", speed: 0.544_374_7 },
    Constituent { name: "SSA", speed: 0.082_137_3 },
    Constituent { name: "SA", speed: 0.041_068_6 },
    Constituent { name: "M4", speed: 57.968_208_4 },
    Constituent { name: "MS4", speed: 58.984_104_2 },
    Constituent { name: "MN4", speed: 57.423_833_7 },
    Constituent { name: "M6", speed: 86.952_312_7 },
    Constituent { name: "M8", speed: 115.936_416_6 },
];

impl Constituent {
    /// Look up a constituent by name, ignoring case.
    pub fn lookup(name: &str) -> Option<Self> {
        CATALOGUE
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .copied()
    }

    /// All constituents known to [`lookup`](Self::lookup).
    pub fn catalogue() -> &'static [Constituent] {
        CATALOGUE
    }

    /// Angular frequency in radians per second.
    pub fn angular_frequency(&self) -> f64 {
        self.speed.to_radians() / 3600.0
    }

    /// Period in hours.
    pub fn period_hours(&self) -> f64 {
        360.0 / self.speed
    }
}

/// A harmonic decomposition capability.
///
/// Implementations receive the constituents to fit, observation times in
/// seconds since the reference epoch and the matching levels. They return one
/// `(amplitude, phase in radians)` pair per constituent, in the same order.
pub trait HarmonicSolver {
    fn solve(
        &self,
        constituents: &[Constituent],
        seconds: &[f64],
        levels: &[f64],
    ) -> Result<Vec<(f64, f64)>>;
}

/// Ordinary least-squares fit of a mean plus one cosine/sine pair per
/// constituent.
///
/// With `h ≈ z₀ + Σ aᵢ cos ωᵢt + bᵢ sin ωᵢt` the amplitude is `√(aᵢ² + bᵢ²)`
/// and the phase `atan2(bᵢ, aᵢ)` in `[0, 2π)`. The design matrix is solved
/// through its SVD; a rank-deficient system (duplicate constituents, or a
/// record too short to resolve two close frequencies) is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeastSquaresSolver;

impl HarmonicSolver for LeastSquaresSolver {
    fn solve(
        &self,
        constituents: &[Constituent],
        seconds: &[f64],
        levels: &[f64],
    ) -> Result<Vec<(f64, f64)>> {
        if seconds.len() != levels.len() {
            return Err(TideError::Analysis(format!(
                "{} timestamps but {} levels",
                seconds.len(),
                levels.len()
            )));
        }

        let unknowns = 1 + 2 * constituents.len();
        if seconds.len() < unknowns {
            return Err(TideError::Analysis(format!(
                "{} observations cannot determine {} unknowns",
                seconds.len(),
                unknowns
            )));
        }

        // Design matrix: a column of ones, then cos/sin per constituent
        let omegas: Vec<f64> = constituents.iter().map(Constituent::angular_frequency).collect();
        let design = DMatrix::from_fn(seconds.len(), unknowns, |row, col| {
            if col == 0 {
                return 1.0;
            }
            let phase = omegas[(col - 1) / 2] * seconds[row];
            if col % 2 == 1 {
                phase.cos()
            } else {
                phase.sin()
            }
        });
        let y = DVector::from_column_slice(levels);

        let svd = SVD::new(design, true, true);
        let max_sv = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
        let eps = RANK_TOLERANCE * max_sv;
        if svd.rank(eps) < unknowns {
            return Err(TideError::Analysis(
                "singular system; record too short to separate the constituents".to_string(),
            ));
        }

        let coefficients = svd
            .solve(&y, eps)
            .map_err(|e| TideError::Analysis(format!("least-squares solve failed: {e}")))?;

        debug!("least-squares mean level {:.4}", coefficients[0]);

        Ok((0..constituents.len())
            .map(|k| {
                let a = coefficients[1 + 2 * k];
                let b = coefficients[2 + 2 * k];
                (a.hypot(b), b.atan2(a).rem_euclid(TAU))
            })
            .collect())
    }
}

/// Amplitude and phase of one constituent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstituentEstimate {
    /// Name as requested by the caller
    pub name: String,
    /// Amplitude in the series' unit
    pub amplitude: f64,
    /// Phase in degrees relative to the epoch
    pub phase: f64,
}

/// Harmonic analysis output, ordered like the requested constituents.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HarmonicResult {
    pub constituents: Vec<ConstituentEstimate>,
    /// Present samples used in the fit
    pub observations: usize,
}

impl HarmonicResult {
    pub fn get(&self, name: &str) -> Option<&ConstituentEstimate> {
        self.constituents
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn amplitudes(&self) -> Vec<f64> {
        self.constituents.iter().map(|c| c.amplitude).collect()
    }

    pub fn phases(&self) -> Vec<f64> {
        self.constituents.iter().map(|c| c.phase).collect()
    }
}

/// Harmonic analysis with the default [`LeastSquaresSolver`].
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tidal_analysis_lib::harmonic::{tidal_analysis, Constituent};
/// use tidal_analysis_lib::synthetic::{tide_signal, SyntheticConstituent};
///
/// let epoch = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
/// let m2 = Constituent::lookup("M2").unwrap();
/// let series = tide_signal(
///     &[SyntheticConstituent { constituent: m2, amplitude: 1.2, phase: 0.5 }],
///     0.0,
///     &epoch,
///     epoch.naive_utc(),
///     Duration::hours(1),
///     24 * 30,
/// );
///
/// let result = tidal_analysis(&series, &["M2"], &epoch).unwrap();
/// assert!((result.amplitudes()[0] - 1.2).abs() < 1e-6);
/// assert!((result.phases()[0] - 0.5f64.to_degrees()).abs() < 1e-4);
/// ```
pub fn tidal_analysis<Tz, S>(
    series: &TideSeries,
    constituents: &[S],
    epoch: &DateTime<Tz>,
) -> Result<HarmonicResult>
where
    Tz: TimeZone,
    S: AsRef<str>,
{
    tidal_analysis_with(&LeastSquaresSolver, series, constituents, epoch)
}

/// Harmonic analysis with a caller-supplied solver.
///
/// The epoch's absolute instant anchors the phases: the same wall-clock time
/// in a different zone gives different phases.
pub fn tidal_analysis_with<H, Tz, S>(
    solver: &H,
    series: &TideSeries,
    constituents: &[S],
    epoch: &DateTime<Tz>,
) -> Result<HarmonicResult>
where
    H: HarmonicSolver + ?Sized,
    Tz: TimeZone,
    S: AsRef<str>,
{
    if constituents.is_empty() {
        return Err(TideError::Analysis("no constituents requested".to_string()));
    }

    let resolved = constituents
        .iter()
        .map(|name| {
            Constituent::lookup(name.as_ref()).ok_or_else(|| {
                TideError::Analysis(format!("unknown constituent '{}'", name.as_ref()))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let origin = epoch.timestamp();
    let (seconds, levels): (Vec<f64>, Vec<f64>) = series
        .samples
        .iter()
        .filter_map(|s| {
            s.value()
                .map(|v| ((s.time.and_utc().timestamp() - origin) as f64, v))
        })
        .unzip();

    let dropped = series.len() - levels.len();
    if dropped > 0 {
        debug!("dropped {dropped} missing samples before harmonic fit");
    }
    if levels.is_empty() {
        return Err(TideError::Analysis("series has no present samples".to_string()));
    }

    let fitted = solver.solve(&resolved, &seconds, &levels)?;
    if fitted.len() != resolved.len() {
        return Err(TideError::Analysis(format!(
            "solver returned {} results for {} constituents",
            fitted.len(),
            resolved.len()
        )));
    }

    let estimates = constituents
        .iter()
        .zip(fitted)
        .map(|(name, (amplitude, phase))| {
            if !amplitude.is_finite() || !phase.is_finite() {
                return Err(TideError::Analysis(format!(
                    "solver did not converge for '{}'",
                    name.as_ref()
                )));
            }
            Ok(ConstituentEstimate {
                name: name.as_ref().to_string(),
                amplitude,
                phase: phase.to_degrees(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(HarmonicResult {
        constituents: estimates,
        observations: levels.len(),
    })
}
