//! # Station Reports
//!
//! Runs the standard analysis chain over a merged station record and renders
//! the results for the console:
//!
//! 1. Summary of the record (span, sample and missing counts)
//! 2. Longest contiguous hourly run
//! 3. Sea-level rise over the whole record
//! 4. Harmonic constituents fitted on the contiguous run
//!
//! A product that cannot be computed for this record (too few years for a
//! trend, no usable run for harmonics) is left out of the report with a note
//! rather than failing the whole station.

use crate::config::Config;
use crate::contiguity::longest_contiguous_run;
use crate::harmonic::{tidal_analysis, HarmonicResult};
use crate::trend::{fit_sea_level_trend, TrendFit};
use crate::{Result, TideError, TideSeries};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use log::warn;
use serde::Serialize;
use std::fmt;

/// Span of the contiguous run used for harmonic analysis
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub samples: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

/// Everything computed for one station record
#[derive(Clone, Debug, Serialize)]
pub struct StationReport {
    /// Where the data came from, usually the station directory
    pub source: String,
    pub samples: usize,
    pub missing: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub contiguous: RunSummary,
    pub trend: Option<TrendFit>,
    /// Phase reference used for the harmonics
    pub epoch: Option<DateTime<FixedOffset>>,
    pub harmonics: Option<HarmonicResult>,
    /// Products that were skipped and why
    pub notes: Vec<String>,
}

/// Run the analysis chain on a station record.
///
/// Only configuration problems are errors; data-dependent failures end up in
/// [`StationReport::notes`].
pub fn analyze_station(source: &str, series: &TideSeries, config: &Config) -> Result<StationReport> {
    let mut notes = Vec::new();

    let run = longest_contiguous_run(
        series,
        config.contiguity.interval(),
        config.contiguity.tolerance(),
    );

    let trend = match fit_sea_level_trend(series) {
        Ok(fit) => Some(fit),
        Err(TideError::InsufficientData(reason)) => {
            notes.push(format!("no sea-level trend: {reason}"));
            None
        }
        Err(e) => return Err(e),
    };

    let epoch = match (config.harmonic.epoch()?, run.first_time()) {
        (Some(epoch), _) => Some(epoch),
        (None, Some(start)) => Some(Utc.from_utc_datetime(&start).fixed_offset()),
        (None, None) => None,
    };

    let harmonics = match epoch {
        None => {
            notes.push("no harmonics: no contiguous data".to_string());
            None
        }
        Some(epoch) => match tidal_analysis(&run, &config.harmonic.constituents, &epoch) {
            Ok(result) => Some(result),
            Err(TideError::Analysis(reason)) => {
                warn!("harmonic analysis of {source} failed: {reason}");
                notes.push(format!("no harmonics: {reason}"));
                None
            }
            Err(e) => return Err(e),
        },
    };

    Ok(StationReport {
        source: source.to_string(),
        samples: series.len(),
        missing: series.missing_count(),
        first: series.first_time(),
        last: series.last_time(),
        contiguous: RunSummary {
            samples: run.len(),
            first: run.first_time(),
            last: run.last_time(),
        },
        trend,
        epoch,
        harmonics,
        notes,
    })
}

/// Human-readable report.
pub fn render_text(report: &StationReport) -> String {
    report.to_string()
}

fn span(first: Option<NaiveDateTime>, last: Option<NaiveDateTime>) -> String {
    match (first, last) {
        (Some(a), Some(b)) => format!("{a} → {b}"),
        _ => "-".to_string(),
    }
}

impl fmt::Display for StationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Station: {}", self.source)?;
        writeln!(
            f,
            "Record:  {} samples ({} missing), {}",
            self.samples,
            self.missing,
            span(self.first, self.last)
        )?;
        writeln!(
            f,
            "Longest contiguous run: {} samples, {}",
            self.contiguous.samples,
            span(self.contiguous.first, self.contiguous.last)
        )?;

        if let Some(trend) = &self.trend {
            writeln!(
                f,
                "Sea-level rise: {:.2} mm/yr (± {:.2}, r = {:.3}, {} years)",
                trend.rate_mm_per_year,
                trend.std_err * 1000.0,
                trend.r_value,
                trend.years
            )?;
        }

        if let Some(harmonics) = &self.harmonics {
            if let Some(epoch) = self.epoch {
                writeln!(f, "Harmonics (phase epoch {}):", epoch.to_rfc3339())?;
            }
            writeln!(f, "  {:<6} {:>10} {:>10}", "Name", "Amp (m)", "Phase (°)")?;
            for c in &harmonics.constituents {
                writeln!(f, "  {:<6} {:>10.4} {:>10.2}", c.name, c.amplitude, c.phase)?;
            }
        }

        for note in &self.notes {
            writeln!(f, "Note: {note}")?;
        }
        Ok(())
    }
}

/// Pretty JSON report.
pub fn render_json(report: &StationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Print the text report to stdout.
pub fn print_report(report: &StationReport) {
    print!("{}", render_text(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::semidiurnal;
    use crate::Sample;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_report_on_synthetic_record() {
        // 60 days spanning two calendar years
        let series = semidiurnal(start(), 24 * 60);
        let report = analyze_station("synthetic", &series, &Config::default()).unwrap();

        assert_eq!(report.samples, 24 * 60);
        assert_eq!(report.contiguous.samples, 24 * 60);
        assert!(report.trend.is_some());

        let harmonics = report.harmonics.as_ref().unwrap();
        let m2 = harmonics.get("M2").unwrap();
        assert!((m2.amplitude - 1.31).abs() < 1e-6);
        assert!(m2.phase.abs() < 1e-3 || (m2.phase - 360.0).abs() < 1e-3);

        let text = render_text(&report);
        assert!(text.contains("Station: synthetic"));
        assert!(text.contains("M2"));
        assert!(text.contains("mm/yr"));
    }

    #[test]
    fn test_single_year_record_notes_missing_trend() {
        let series = semidiurnal(start(), 24 * 20);
        let report = analyze_station("short", &series, &Config::default()).unwrap();
        assert!(report.trend.is_none());
        assert!(report.notes.iter().any(|n| n.contains("trend")));
        assert!(report.harmonics.is_some());
    }

    #[test]
    fn test_empty_record_reports_without_products() {
        let series = TideSeries::from_samples(vec![Sample::missing(start())]);
        let report = analyze_station("empty", &series, &Config::default()).unwrap();
        assert!(report.trend.is_none());
        assert!(report.harmonics.is_none());
        assert_eq!(report.notes.len(), 2);
    }

    #[test]
    fn test_text_for_empty_record_has_placeholders_and_notes() {
        let series = TideSeries::from_samples(vec![Sample::missing(start())]);
        let report = analyze_station("empty", &series, &Config::default()).unwrap();
        let text = render_text(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Station: empty");
        assert_eq!(lines[2], "Longest contiguous run: 0 samples, -");
        assert!(!text.contains("Harmonics"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("Note: ")).count(), 2);
        assert_eq!(text, report.to_string());
    }

    #[test]
    fn test_json_contains_products() {
        let series = semidiurnal(start(), 24 * 10);
        let mut config = Config::default();
        config.harmonic.epoch = Some("2021-12-01T00:00:00Z".to_string());
        let report = analyze_station("json", &series, &config).unwrap();

        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(json["source"], "json");
        assert_eq!(json["harmonics"]["constituents"][0]["name"], "M2");
        assert!(json["trend"].is_null());
    }

    #[test]
    fn test_bad_epoch_is_error() {
        let series = semidiurnal(start(), 24);
        let mut config = Config::default();
        config.harmonic.epoch = Some("not a date".to_string());
        assert!(matches!(
            analyze_station("bad", &series, &config),
            Err(TideError::Config(_))
        ));
    }
}
