//! # Tide-Gauge File Ingestion
//!
//! This module turns station text files into [`TideSeries`] values. It is the
//! only part of the crate that touches the file system; the analytical modules
//! only ever see the in-memory series it returns.
//!
//! ## File Format
//!
//! Fixed-width records as distributed for UK tide-gauge stations:
//! ```text
//! Port:              P035
//! Site:              Aberdeen
//! ...                (12 header lines in total)
//!   1) 1946/01/01 00:00:00     3.6329      0.1048
//!   2) 1946/01/01 01:00:00     3.0921M    -0.1273
//!   3) 1946/01/01 02:00:00   -99.0000N    -0.0123
//! ```
//! Columns are cycle number, date, time, sea level and residual. The sea-level
//! column may carry a trailing quality flag (`M`, `N`, `T`), which is stripped.
//!
//! ## Missing Data
//! - The sentinel `-99.0` becomes a missing sample
//! - A level with no numeric content (`nan`, `None`, bare flag) is missing too
//! - Rows with too few columns or an unreadable timestamp are errors, reported
//!   with file and line number
//!
//! The residual column is discarded.

use crate::config::IngestConfig;
use crate::series::join_all;
use crate::{Result, Sample, TideError, TideSeries};
use chrono::NaiveDateTime;
use log::{debug, info};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

/// Accepted date + time layouts, tried in order
const TIMESTAMP_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Read one station file with default settings.
pub fn read_tidal_data<P: AsRef<Path>>(path: P) -> Result<TideSeries> {
    read_tidal_data_with(path, &IngestConfig::default())
}

/// Read one station file.
///
/// # Errors
/// - [`TideError::NotFound`] when the file does not exist
/// - [`TideError::Parse`] for a malformed data row
/// - [`TideError::Io`] for any other read failure
pub fn read_tidal_data_with<P: AsRef<Path>>(path: P, config: &IngestConfig) -> Result<TideSeries> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TideError::NotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    let series = parse_tidal_text(&text, path, config)?;

    debug!(
        "read {} samples ({} missing) from {}",
        series.len(),
        series.missing_count(),
        path.display()
    );
    Ok(series)
}

/// Parse the contents of a station file. `source` is only used in errors.
pub fn parse_tidal_text(text: &str, source: &Path, config: &IngestConfig) -> Result<TideSeries> {
    let mut samples = Vec::new();

    for (index, line) in text.lines().enumerate().skip(config.header_lines) {
        if line.trim().is_empty() {
            continue;
        }

        let parse_error = |reason: String| TideError::Parse {
            path: source.to_path_buf(),
            line: index + 1,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(parse_error(format!(
                "expected at least 4 columns, found {}",
                fields.len()
            )));
        }

        let stamp = format!("{} {}", fields[1], fields[2]);
        let time = parse_timestamp(&stamp)
            .ok_or_else(|| parse_error(format!("unreadable timestamp '{stamp}'")))?;

        samples.push(Sample {
            time,
            level: parse_level(fields[3], config.missing_sentinel),
        });
    }

    Ok(TideSeries::from_samples(samples))
}

/// Read every `*.txt` station file in `dir` and merge them.
///
/// Files are read in name order. A directory without station files is
/// reported as [`TideError::NotFound`].
pub fn read_directory<P: AsRef<Path>>(dir: P, config: &IngestConfig) -> Result<TideSeries> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(TideError::NotFound(dir.to_path_buf()));
    }

    let files = station_files(dir)?;
    if files.is_empty() {
        return Err(TideError::NotFound(dir.join("*.txt")));
    }

    let parts = files
        .iter()
        .map(|file| read_tidal_data_with(file, config))
        .collect::<Result<Vec<_>>>()?;

    let merged = join_all(&parts);
    info!(
        "loaded {} files from {} ({} samples)",
        files.len(),
        dir.display(),
        merged.len()
    );
    Ok(merged)
}

/// Station files in `dir`, sorted by name.
pub fn station_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_txt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if path.is_file() && is_txt {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Numeric part of a raw level field, `None` when missing.
///
/// ```
/// use tidal_analysis_lib::tide_data::parse_level;
///
/// assert_eq!(parse_level("3.0921M", -99.0), Some(3.0921));
/// assert_eq!(parse_level("-99.0000N", -99.0), None);
/// assert_eq!(parse_level("nan", -99.0), None);
/// ```
pub fn parse_level(raw: &str, sentinel: f64) -> Option<f64> {
    let number = number_pattern().find(raw)?;
    let value: f64 = number.as_str().parse().ok()?;
    if (value - sentinel).abs() < 1e-9 {
        None
    } else {
        Some(value)
    }
}

fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stamp, fmt).ok())
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[-+]?[0-9]*\.?[0-9]+").expect("number pattern should be valid")
    })
}
