//! Unit conversion utilities
//!
//! Handles conversion between Metric (mm) and Imperial (inch) systems for
//! lengths and feed rates. Motion programs carry lengths in millimetres and
//! velocities in whatever unit the CAM host uses internally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl MeasurementSystem {
    /// Length unit label ("mm" or "in")
    pub fn length_label(self) -> &'static str {
        match self {
            Self::Metric => "mm",
            Self::Imperial => "in",
        }
    }

    /// Feed rate unit used for output in this system
    pub fn feed_units(self) -> FeedRateUnits {
        match self {
            Self::Metric => FeedRateUnits::MmPerMin,
            Self::Imperial => FeedRateUnits::InPerMin,
        }
    }

    /// Convert a length in millimetres into this system's length unit
    pub fn length_from_mm(self, value_mm: f64) -> f64 {
        match self {
            Self::Metric => value_mm,
            Self::Imperial => value_mm / MM_PER_INCH,
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

/// Feed rate units selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedRateUnits {
    /// Millimeters per minute
    #[default]
    MmPerMin,
    /// Millimeters per second
    MmPerSec,
    /// Inches per minute
    InPerMin,
    /// Inches per second
    InPerSec,
}

impl FeedRateUnits {
    /// Scale factor from this unit into mm/min
    fn to_mm_per_min(self) -> f64 {
        match self {
            Self::MmPerMin => 1.0,
            Self::MmPerSec => 60.0,
            Self::InPerMin => MM_PER_INCH,
            Self::InPerSec => MM_PER_INCH * 60.0,
        }
    }
}

impl fmt::Display for FeedRateUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MmPerMin => write!(f, "mm/min"),
            Self::MmPerSec => write!(f, "mm/sec"),
            Self::InPerMin => write!(f, "in/min"),
            Self::InPerSec => write!(f, "in/sec"),
        }
    }
}

/// Convert a feed rate between units
///
/// * `value` - Feed rate expressed in `from`
/// * `from` - Source units
/// * `to` - Target units
pub fn convert_feed_rate(value: f64, from: FeedRateUnits, to: FeedRateUnits) -> f64 {
    if from == to {
        return value;
    }
    value * from.to_mm_per_min() / to.to_mm_per_min()
}
