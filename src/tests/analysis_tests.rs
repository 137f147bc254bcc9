//! # Analysis Property Tests
//!
//! Cross-module properties of the analytical core: mean removal, merging,
//! contiguity, trend and harmonic recovery. Randomised cases use proptest.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use proptest::prelude::*;

use crate::contiguity::get_longest_contiguous_data;
use crate::harmonic::{tidal_analysis, Constituent};
use crate::series::{
    extract_section_remove_mean, extract_single_year_remove_mean, join_data, mean_level,
};
use crate::synthetic::{tide_signal, SyntheticConstituent};
use crate::trend::sea_level_rise;
use crate::{Sample, TideError, TideSeries};

fn jan1(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly series from `start` with the given levels
fn hourly(start: NaiveDateTime, levels: &[Option<f64>]) -> TideSeries {
    TideSeries::from_samples(
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| Sample {
                time: start + Duration::hours(i as i64),
                level: *level,
            })
            .collect(),
    )
}

/// A full 2020 record of 1..=8760 comes back whole with a zero mean.
#[test]
fn year_2020_ramp_has_exact_zero_mean() {
    let levels: Vec<Option<f64>> = (1..=8760).map(|v| Some(v as f64)).collect();
    let series = hourly(jan1(2020), &levels);

    let year = extract_single_year_remove_mean(2020, &series).unwrap();

    assert_eq!(year.len(), 8760);
    assert_eq!(mean_level(&year.samples), Some(0.0));
    assert_eq!(year.samples[0].level, Some(1.0 - 4380.5));
}

/// Three hourly blocks of 3, 7 and 2 samples: the 7 wins.
#[test]
fn longest_of_three_synthetic_blocks() {
    let mut samples = hourly(jan1(2021), &[Some(1.0); 3]).samples;
    samples.extend(hourly(jan1(2021) + Duration::hours(5), &[Some(2.0); 7]).samples);
    samples.extend(hourly(jan1(2021) + Duration::hours(20), &[Some(3.0); 2]).samples);
    let series = TideSeries::from_samples(samples);

    let run = get_longest_contiguous_data(&series);

    let expected: Vec<_> = (5..12).map(|h| jan1(2021) + Duration::hours(h)).collect();
    assert_eq!(run.samples.iter().map(|s| s.time).collect::<Vec<_>>(), expected);
}

/// Annual means rising 5 mm/yr give 5.0; one year is not enough.
#[test]
fn trend_of_five_millimetres() {
    let samples: Vec<Sample> = (1980..2020)
        .map(|y| Sample::new(jan1(y) + Duration::days(180), 4.0 + 0.005 * (y - 1980) as f64))
        .collect();
    let rate = sea_level_rise(&TideSeries::from_samples(samples)).unwrap();
    assert!((rate - 5.0).abs() < 1e-6, "rate was {rate}");

    let single = TideSeries::from_samples(vec![Sample::new(jan1(2000), 1.0)]);
    assert!(matches!(
        sea_level_rise(&single),
        Err(TideError::InsufficientData(_))
    ));
}

/// A pure O1 signal is recovered through the full wrapper.
#[test]
fn harmonic_recovers_known_signal() {
    let epoch = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
    let o1 = SyntheticConstituent {
        constituent: Constituent::lookup("O1").unwrap(),
        amplitude: 0.137,
        phase: 2.5,
    };
    let series = tide_signal(
        &[o1],
        0.0,
        &epoch,
        epoch.naive_utc(),
        Duration::hours(1),
        24 * 45,
    );

    let result = tidal_analysis(&series, &["O1"], &epoch).unwrap();
    assert!((result.amplitudes()[0] - 0.137).abs() < 1e-6);
    assert!((result.phases()[0] - 2.5f64.to_degrees()).abs() < 1e-3);
}

/// Joining a full-range mean-removed series with itself keeps the original
/// timestamps, each twice, with values shifted by the mean.
#[test]
fn full_range_mean_removal_then_self_join() {
    let series = hourly(jan1(2019), &[Some(1.0), Some(2.0), None, Some(6.0)]);
    let (start, end) = (series.first_time().unwrap(), series.last_time().unwrap());

    let removed = extract_section_remove_mean(start, end, &series).unwrap();
    let doubled = join_data(&removed, &removed);

    let original_times: Vec<_> = series.samples.iter().map(|s| s.time).collect();
    let doubled_times: Vec<_> = doubled.samples.iter().map(|s| s.time).collect();
    let expected: Vec<_> = original_times.iter().flat_map(|t| [*t, *t]).collect();
    assert_eq!(doubled_times, expected);

    for (orig, shifted) in series.samples.iter().zip(removed.samples.iter()) {
        match (orig.level, shifted.level) {
            (Some(a), Some(b)) => assert!((a - b - 3.0).abs() < 1e-12),
            (None, None) => {}
            other => panic!("presence changed: {other:?}"),
        }
    }
}

fn arb_series() -> impl Strategy<Value = TideSeries> {
    prop::collection::vec(
        (
            0i64..(3 * 365 * 24),
            prop::option::weighted(0.9, -5.0f64..10.0),
        ),
        0..200,
    )
    .prop_map(|rows| {
        TideSeries::from_samples(
            rows.into_iter()
                .map(|(hours, level)| Sample {
                    time: jan1(2019) + Duration::hours(hours),
                    level,
                })
                .collect(),
        )
    })
}

proptest! {
    #[test]
    fn year_extraction_has_zero_mean(series in arb_series(), year in 2018i32..2023) {
        let result = extract_single_year_remove_mean(year, &series).unwrap();
        if let Some(mean) = mean_level(&result.samples) {
            prop_assert!(mean.abs() < 1e-9, "mean {}", mean);
        }
        prop_assert!(result.samples.iter().all(|s| s.time.year() == year));
    }

    #[test]
    fn join_is_commutative(a in arb_series(), b in arb_series()) {
        let ab = join_data(&a, &b);
        let ba = join_data(&b, &a);
        prop_assert_eq!(ab.len(), a.len() + b.len());
        prop_assert!(ab.is_sorted());
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn longest_run_is_regular_and_present(series in arb_series()) {
        let run = get_longest_contiguous_data(&series);
        prop_assert!(run.samples.iter().all(|s| !s.is_missing()));
        prop_assert!(run.samples.windows(2).all(|w| w[1].time - w[0].time == Duration::hours(1)));
        if series.values().next().is_some() {
            prop_assert!(!run.is_empty());
        }
    }
}
