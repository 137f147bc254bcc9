//! # Synthetic Tide Signals
//!
//! Known-answer inputs for checking the analysis chain. A signal is built
//! from constituents with chosen amplitude and phase:
//!
//! h(t) = mean + Σᵢ Aᵢ cos(ωᵢ t − φᵢ)
//!
//! with `t` in seconds since the epoch, the same convention the harmonic
//! solver reports in. Feeding a synthetic series back through
//! [`tidal_analysis`](crate::harmonic::tidal_analysis) must return the
//! amplitudes and phases it was built from.
//!
//! [`semidiurnal`] gives a ready-made M2 + S2 record with a realistic UK
//! east-coast range for quick experiments.

use crate::harmonic::Constituent;
use crate::{Sample, TideSeries};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// One term of a synthetic signal.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticConstituent {
    pub constituent: Constituent,
    /// Amplitude in metres
    pub amplitude: f64,
    /// Phase in radians
    pub phase: f64,
}

/// Evenly spaced series of `count` samples from `start`.
pub fn tide_signal<Tz: TimeZone>(
    components: &[SyntheticConstituent],
    mean_level: f64,
    epoch: &DateTime<Tz>,
    start: NaiveDateTime,
    step: Duration,
    count: usize,
) -> TideSeries {
    let origin = epoch.timestamp();
    let mut samples = Vec::with_capacity(count);

    for i in 0..count {
        let time = start + step * i as i32;
        let t = (time.and_utc().timestamp() - origin) as f64;
        let level = components.iter().fold(mean_level, |acc, c| {
            acc + c.amplitude * (c.constituent.angular_frequency() * t - c.phase).cos()
        });
        samples.push(Sample::new(time, level));
    }

    TideSeries::from_samples(samples)
}

/// Hourly M2 + S2 record starting at `start`, phases relative to `start`.
pub fn semidiurnal(start: NaiveDateTime, hours: usize) -> TideSeries {
    // Amplitudes in the range of an Aberdeen-type semidiurnal regime
    const A_M2: f64 = 1.31; // m
    const A_S2: f64 = 0.45; // m
    const MEAN_LEVEL: f64 = 2.5; // m above chart datum

    let components = [
        SyntheticConstituent {
            constituent: m2(),
            amplitude: A_M2,
            phase: 0.0,
        },
        SyntheticConstituent {
            constituent: s2(),
            amplitude: A_S2,
            phase: 0.0,
        },
    ];

    let epoch = Utc.from_utc_datetime(&start);
    tide_signal(&components, MEAN_LEVEL, &epoch, start, Duration::hours(1), hours)
}

fn m2() -> Constituent {
    Constituent::lookup("M2").expect("M2 is in the catalogue")
}

fn s2() -> Constituent {
    Constituent::lookup("S2").expect("S2 is in the catalogue")
}
