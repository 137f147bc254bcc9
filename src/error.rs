//! Error type shared by ingestion and the analytical core.
//!
//! An empty selection (no samples in a year, range or contiguous search) is
//! not an error: those operations return an empty [`TideSeries`](crate::TideSeries).

use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or analysing tide-gauge data.
#[derive(Error, Debug)]
pub enum TideError {
    /// Input file or directory does not exist (or holds no station files)
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A data row could not be understood
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Series is unsorted or does not carry the sea-level quantity
    #[error("invalid series: {0}")]
    StructuralInvalid(String),

    /// Not enough points to fit a trend
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Harmonic solver failed or returned inconsistent output
    #[error("harmonic analysis failed: {0}")]
    Analysis(String),

    /// Configuration value could not be interpreted
    #[error("invalid config: {0}")]
    Config(String),

    /// File system operation failed
    #[error("IO: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TideError>;
