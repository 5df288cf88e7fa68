//! Export options and session configuration
//!
//! [`ExportOptions`] is the loose, serializable form that hosts hand over
//! (JSON, TOML or a post-processor argument string). [`SessionConfig`] is the
//! validated, frozen form used for one export.

use crate::error::{ConfigResult, ConfigurationError};
use crate::profile::{MachineProfile, Toolhead};
use clap::Parser;
use serde::{Deserialize, Serialize};
use snappost_core::{convert_feed_rate, FeedRateUnits, MeasurementSystem};
use std::path::Path;
use tracing::debug;

/// Vertical feed multiplier applied when retracting out of a hole
pub const HOLE_RETRACT_FACTOR: f64 = 10.0;

/// Whether the drill stays at retract height between holes
pub const MOVE_DRILL_IN_RETRACT_HEIGHT: bool = false;

const DEFAULT_PREAMBLE: &str = "G17 G54 G40 G49 G80 G90";
const DEFAULT_POSTAMBLE: &str = "M5";
const MAX_PRECISION: usize = 10;
const MIN_SEGMENTS_PER_CM: f64 = 1.0;
const MAX_SEGMENTS_PER_CM: f64 = 100.0;

/// Options supplied by the host for one export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub output_header: bool,
    pub output_comments: bool,
    pub output_line_numbers: bool,
    /// Counter base; the first numbered line is `base + 10`
    pub line_number_start: u32,
    /// Decimal digits; `None` picks 3 for metric and 4 for imperial
    pub precision: Option<usize>,
    pub segments_per_cm: f64,
    pub break_straights: bool,
    pub preamble: String,
    pub postamble: String,
    pub pre_operation: String,
    pub post_operation: String,
    pub units: MeasurementSystem,
    pub modal: bool,
    pub axis_modal: bool,
    pub toolhead: Toolhead,
    /// Velocity unit of F words in the incoming motion program
    pub input_feed_units: FeedRateUnits,
    /// Fallback horizontal feed in mm/min
    pub default_feed_horizontal: f64,
    /// Fallback vertical feed in mm/min
    pub default_feed_vertical: f64,
    pub machine_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_header: true,
            output_comments: true,
            output_line_numbers: false,
            line_number_start: 100,
            precision: None,
            segments_per_cm: 10.0,
            break_straights: false,
            preamble: DEFAULT_PREAMBLE.to_string(),
            postamble: DEFAULT_POSTAMBLE.to_string(),
            pre_operation: String::new(),
            post_operation: String::new(),
            units: MeasurementSystem::Metric,
            modal: false,
            axis_modal: false,
            toolhead: Toolhead::Standard,
            input_feed_units: FeedRateUnits::MmPerSec,
            default_feed_horizontal: 600.0,
            default_feed_vertical: 300.0,
            machine_name: "Snapmaker".to_string(),
        }
    }
}

/// Post-processor argument vocabulary understood by the CAM host
#[derive(Parser, Debug)]
#[command(name = "snappost", no_binary_name = true, disable_help_flag = true)]
struct PostArgs {
    /// Suppress header output
    #[arg(long)]
    no_header: bool,
    /// Suppress comment output
    #[arg(long)]
    no_comments: bool,
    /// Prefix every line with a line number
    #[arg(long)]
    line_numbers: bool,
    /// Number of digits of precision
    #[arg(long)]
    precision: Option<String>,
    /// Segments per cm for curved paths
    #[arg(long)]
    segments: Option<String>,
    /// Break straight paths with the same resolution as curves
    #[arg(long)]
    break_straight: bool,
    /// Commands issued before the first operation
    #[arg(long, allow_hyphen_values = true)]
    preamble: Option<String>,
    /// Commands issued after the last operation
    #[arg(long, allow_hyphen_values = true)]
    postamble: Option<String>,
    /// Output imperial units (G20)
    #[arg(long)]
    inches: bool,
    /// Suppress repeated motion mnemonics
    #[arg(long)]
    modal: bool,
    /// Suppress repeated axis values
    #[arg(long)]
    axis_modal: bool,
    /// Use the 200W level-two CNC toolhead
    #[arg(long = "leveltwocnc")]
    level_two_cnc: bool,
    /// Toolhead by name (standard, level_two)
    #[arg(long)]
    toolhead: Option<String>,
}

impl ExportOptions {
    /// Parse options from JSON
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse options from TOML
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Load options from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(ConfigurationError::InvalidOptions(format!(
                "Unsupported options file: {}",
                path.display()
            ))),
        }
    }

    /// Parse a post-processor argument string such as
    /// `--inches --segments 20 --preamble "G17 G90"`
    pub fn from_arg_string(args: &str) -> ConfigResult<Self> {
        let tokens = split_args(args)?;
        let parsed = PostArgs::try_parse_from(tokens)
            .map_err(|e| ConfigurationError::InvalidOptions(e.to_string().trim().to_string()))?;

        let mut options = Self::default();
        if parsed.no_header {
            options.output_header = false;
        }
        if parsed.no_comments {
            options.output_comments = false;
        }
        if parsed.line_numbers {
            options.output_line_numbers = true;
        }
        if let Some(precision) = parsed.precision {
            let digits = precision
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigurationError::InvalidPrecision(precision.clone()))?;
            options.precision = Some(digits);
        }
        if let Some(segments) = parsed.segments {
            options.segments_per_cm = segments
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigurationError::InvalidSegments(segments.clone()))?;
        }
        if parsed.break_straight {
            options.break_straights = true;
        }
        if let Some(preamble) = parsed.preamble {
            options.preamble = unescape_newlines(&preamble);
        }
        if let Some(postamble) = parsed.postamble {
            options.postamble = unescape_newlines(&postamble);
        }
        if parsed.inches {
            options.units = MeasurementSystem::Imperial;
        }
        if parsed.modal {
            options.modal = true;
        }
        if parsed.axis_modal {
            options.axis_modal = true;
        }
        if let Some(name) = parsed.toolhead {
            options.toolhead = name.parse()?;
        }
        if parsed.level_two_cnc {
            options.toolhead = Toolhead::LevelTwo;
        }
        Ok(options)
    }
}

/// Split an argument string into words. Single and double quotes group
/// words; a backslash escapes a quote or another backslash.
fn split_args(input: &str) -> ConfigResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') if matches!(chars.peek(), Some('"' | '\'' | '\\')) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_token = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ConfigurationError::InvalidOptions(
            "Unbalanced quote in option string".to_string(),
        ));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Validated translation settings for one export
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub precision: usize,
    pub units: MeasurementSystem,
    pub input_feed_units: FeedRateUnits,
    pub output_header: bool,
    pub output_comments: bool,
    pub output_line_numbers: bool,
    pub line_number_start: u32,
    pub modal: bool,
    pub axis_modal: bool,
    pub segments_per_cm: f64,
    pub break_straights: bool,
    pub hole_retract_factor: f64,
    pub move_drill_in_retract_height: bool,
    /// Fallback feeds in the session speed unit
    pub default_feed_horizontal: f64,
    pub default_feed_vertical: f64,
    pub preamble: String,
    pub postamble: String,
    pub pre_operation: String,
    pub post_operation: String,
    pub machine_name: String,
    pub profile: Option<MachineProfile>,
}

impl SessionConfig {
    /// Validate `options` and freeze them into a session configuration
    pub fn resolve(options: &ExportOptions) -> ConfigResult<Self> {
        let precision = match options.precision {
            Some(p) if p > MAX_PRECISION => {
                return Err(ConfigurationError::InvalidPrecision(format!(
                    "{} (maximum is {})",
                    p, MAX_PRECISION
                )))
            }
            Some(p) => p,
            None => default_precision(options.units),
        };

        if !options.segments_per_cm.is_finite() {
            return Err(ConfigurationError::InvalidSegments(
                options.segments_per_cm.to_string(),
            ));
        }
        let segments_per_cm = options
            .segments_per_cm
            .clamp(MIN_SEGMENTS_PER_CM, MAX_SEGMENTS_PER_CM);

        let speed_units = options.units.feed_units();
        let default_feed_horizontal =
            validate_feed("default_feed_horizontal", options.default_feed_horizontal)?;
        let default_feed_vertical =
            validate_feed("default_feed_vertical", options.default_feed_vertical)?;

        let config = Self {
            precision,
            units: options.units,
            input_feed_units: options.input_feed_units,
            output_header: options.output_header,
            output_comments: options.output_comments,
            output_line_numbers: options.output_line_numbers,
            line_number_start: options.line_number_start,
            modal: options.modal,
            axis_modal: options.axis_modal,
            segments_per_cm,
            break_straights: options.break_straights,
            hole_retract_factor: HOLE_RETRACT_FACTOR,
            move_drill_in_retract_height: MOVE_DRILL_IN_RETRACT_HEIGHT,
            default_feed_horizontal: convert_feed_rate(
                default_feed_horizontal,
                FeedRateUnits::MmPerMin,
                speed_units,
            ),
            default_feed_vertical: convert_feed_rate(
                default_feed_vertical,
                FeedRateUnits::MmPerMin,
                speed_units,
            ),
            preamble: options.preamble.clone(),
            postamble: options.postamble.clone(),
            pre_operation: options.pre_operation.clone(),
            post_operation: options.post_operation.clone(),
            machine_name: options.machine_name.clone(),
            profile: Some(options.toolhead.profile()),
        };
        debug!(
            "Session: {} precision={} segments/cm={} toolhead={}",
            config.units, config.precision, config.segments_per_cm, options.toolhead
        );
        Ok(config)
    }

    /// Output feed rate units
    pub fn speed_units(&self) -> FeedRateUnits {
        self.units.feed_units()
    }

    /// Unit label used in comments ("mm" or "in")
    pub fn length_label(&self) -> &'static str {
        self.units.length_label()
    }

    /// Unit-system instruction for the program header
    pub fn units_command(&self) -> &'static str {
        match self.units {
            MeasurementSystem::Metric => "G21",
            MeasurementSystem::Imperial => "G20",
        }
    }

    /// Convert a program feed rate into the session speed unit
    pub fn feed_from_program(&self, value: f64) -> f64 {
        convert_feed_rate(value, self.input_feed_units, self.speed_units())
    }

    /// Convert a program length (mm) into the session length unit
    pub fn length_from_program(&self, value_mm: f64) -> f64 {
        self.units.length_from_mm(value_mm)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self {
            precision: default_precision(options.units),
            units: options.units,
            input_feed_units: options.input_feed_units,
            output_header: options.output_header,
            output_comments: options.output_comments,
            output_line_numbers: options.output_line_numbers,
            line_number_start: options.line_number_start,
            modal: options.modal,
            axis_modal: options.axis_modal,
            segments_per_cm: options.segments_per_cm,
            break_straights: options.break_straights,
            hole_retract_factor: HOLE_RETRACT_FACTOR,
            move_drill_in_retract_height: MOVE_DRILL_IN_RETRACT_HEIGHT,
            default_feed_horizontal: options.default_feed_horizontal,
            default_feed_vertical: options.default_feed_vertical,
            preamble: options.preamble,
            postamble: options.postamble,
            pre_operation: options.pre_operation,
            post_operation: options.post_operation,
            machine_name: options.machine_name,
            profile: Some(options.toolhead.profile()),
        }
    }
}

fn default_precision(units: MeasurementSystem) -> usize {
    match units {
        MeasurementSystem::Metric => 3,
        MeasurementSystem::Imperial => 4,
    }
}

fn validate_feed(name: &str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::InvalidFeedRate {
            name: name.to_string(),
            value,
        })
    }
}
