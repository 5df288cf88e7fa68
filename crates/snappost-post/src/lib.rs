//! # SnapPost Post-Processor
//!
//! Translates CAM motion programs into G-code for the Snapmaker 2 CNC
//! toolheads. The controller only follows linear moves, so arcs are broken
//! into segments, drilling cycles are expanded into explicit moves and
//! spindle speeds are mapped to power percentages.
//!
//! ## Pipeline
//!
//! 1. [`config`] resolves export options into a [`SessionConfig`]
//! 2. [`translator`] walks each operation using [`discretizer`],
//!    [`drill_cycle`] and [`spindle`]
//! 3. [`boundary`] adds the bounding-box block to the header
//! 4. [`export`] sequences everything and renders the text

pub mod boundary;
pub mod config;
pub mod discretizer;
pub mod drill_cycle;
pub mod error;
pub mod export;
pub mod line;
pub mod profile;
pub mod program;
pub mod spindle;
pub mod translator;

pub use boundary::{annotate, Boundary};
pub use config::{ExportOptions, SessionConfig};
pub use discretizer::{Discretizer, Edge};
pub use drill_cycle::{DrillCycleExpander, DrillExpansion, DrillStep};
pub use error::{AnnotationError, ConfigResult, ConfigurationError, PostError, PostResult};
pub use export::{export, PostProcessor, POST_PROCESSOR_NAME, POST_PROCESSOR_VERSION};
pub use line::{GcodeLine, GcodeProgram, Instruction, Word};
pub use profile::{MachineProfile, Toolhead};
pub use program::{CommandKind, DrillCycle, Job, Operation, ToolpathCommand, ToolpathGroup, ToolpathNode};
pub use spindle::{spindle_power, SpindlePowerMapper};
pub use translator::{MachineState, Translator};
