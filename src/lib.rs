//! # SnapPost
//!
//! G-code post-processor for the Snapmaker 2 CNC toolheads.
//!
//! ## Architecture
//!
//! SnapPost is organized as a workspace with multiple crates:
//!
//! 1. **snappost-core** - Positions, measurement systems, feed rate units
//! 2. **snappost-post** - Motion program model, translation, header and export
//! 3. **snappost** - Command line front end that integrates both crates
//!
//! ## Features
//!
//! - **Linear-only output**: arcs and helices broken into segments at a chosen density
//! - **Canned cycles**: G81/G82/G83 expanded into explicit moves with dwell and pecking
//! - **Spindle power**: RPM mapped to `M3 P<percent>` per toolhead profile
//! - **Snapmaker header**: metadata, bounding box and optional thumbnail
//! - **Options**: CAM-style argument strings, JSON or TOML files

pub use snappost_core::{
    convert_feed_rate, FeedRateUnits, MeasurementSystem, Position, MM_PER_INCH,
};

pub use snappost_post::{
    annotate, export, AnnotationError, Boundary, ConfigurationError, ExportOptions, GcodeProgram,
    Job, MachineProfile, Operation, PostError, PostProcessor, PostResult, SessionConfig,
    Toolhead, ToolpathCommand, ToolpathGroup, ToolpathNode, Translator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Output goes to stderr so the generated program can be piped from stdout.
/// `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: tracing::Level) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
