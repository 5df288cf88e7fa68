//! # SnapPost Core
//!
//! Core types shared by the SnapPost crates: measurement systems, feed rate
//! units and head positions.

pub mod data;
pub mod units;

pub use data::Position;
pub use units::{convert_feed_rate, FeedRateUnits, MeasurementSystem, MM_PER_INCH};
