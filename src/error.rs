//! Typed errors surfaced by the pure parts of the crate.
//!
//! I/O layers (loader, storage, config file reading) and the binary wrap these in
//! `anyhow::Error`; callers of the aggregation functions can match on them directly.

use thiserror::Error;

/// A month or area key is absent from a dataset.
///
/// Fatal to the one render call that hit it, never to the whole map: the
/// application context turns it into the error colour for that area.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("no data for month {month}")]
    MissingMonth { month: String },
    #[error("no data for area '{area}' in month {month}")]
    MissingArea { area: String, month: String },
    #[error("area '{area}' has no Total entry in month {month}")]
    MissingTotal { area: String, month: String },
}

/// Invalid colour-scale configuration. Detected once, when the scale is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("invalid color '{0}': expected #rrggbb or #rrggbbaa")]
    InvalidFormat(String),
    #[error("a color scale needs at least 2 stops, got {0}")]
    TooFewStops(usize),
    #[error("invalid value range {min}..{max}")]
    InvalidRange { min: f64, max: f64 },
    #[error("power curve exponent must be finite and > 0, got {0}")]
    InvalidExponent(f64),
}

/// A month key that does not follow the `YYYYMmm` layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month key '{0}': expected YYYYMmm, e.g. 2020M01")]
pub struct MonthKeyError(pub String);

/// Configuration rejected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("merge threshold must be within 0..=100 percent, got {0}")]
    MergeThreshold(f64),
}
