//! Error types for the post-processor.
//!
//! Configuration problems and missing command parameters abort an export.
//! Boundary annotation problems only drop the boundary block.

use std::io;
use thiserror::Error;

/// Errors raised while building the session configuration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The option string or option file could not be parsed.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The requested decimal precision is not usable.
    #[error("Invalid precision: {0}")]
    InvalidPrecision(String),

    /// The arc segment density is not a finite number.
    #[error("Invalid segment density: {0}")]
    InvalidSegments(String),

    /// A default feed rate is zero, negative or not finite.
    #[error("Invalid default feed rate '{name}': {value}")]
    InvalidFeedRate { name: String, value: f64 },

    /// The toolhead name does not match a known machine profile.
    #[error("Unknown toolhead: {0}")]
    UnknownToolhead(String),

    /// A spindle command was reached without an active machine profile.
    #[error("No machine profile selected for spindle output")]
    MissingProfile,

    /// I/O error while reading an option file.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors raised by the boundary annotator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// The header has no boundary slot (header output disabled).
    #[error("Boundary anchor not found in header")]
    MissingAnchor,

    /// At least one of X, Y or Z never appears on a motion line.
    #[error("No motion found for axis {0}")]
    NoMotion(char),
}

/// Errors that abort a translation or export.
#[derive(Error, Debug)]
pub enum PostError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A command lacks a parameter it cannot be translated without.
    #[error("Command {command} is missing required parameter {parameter}")]
    MissingParameter { command: String, parameter: char },

    /// A command parameter is present but unusable.
    #[error("Command {command} has invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        command: String,
        parameter: char,
        reason: String,
    },
}

/// Result type alias for post-processor operations.
pub type PostResult<T> = Result<T, PostError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;
