//! Export orchestrator
//!
//! Sequences the Snapmaker header, the translated operations and the
//! postamble into one [`GcodeProgram`], then runs the boundary annotator over
//! it. Nothing here touches the filesystem.

use crate::boundary;
use crate::config::{ExportOptions, SessionConfig};
use crate::error::PostResult;
use crate::line::{GcodeProgram, Instruction, Word};
use crate::program::Job;
use crate::translator::Translator;
use chrono::{DateTime, Local};
use snappost_core::{convert_feed_rate, FeedRateUnits};
use tracing::{debug, info, warn};

pub const POST_PROCESSOR_NAME: &str = "snappost";
pub const POST_PROCESSOR_VERSION: &str = env!("CARGO_PKG_VERSION");

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Safe height (mm) and feed (mm/min) of the retract issued after the preamble
const SAFE_RETRACT_Z: f64 = 10.0;
const SAFE_RETRACT_FEED: f64 = 300.0;

/// Turns jobs into Snapmaker 2 CNC programs
#[derive(Debug, Clone)]
pub struct PostProcessor {
    config: SessionConfig,
    generated_at: DateTime<Local>,
    preview: Option<String>,
}

impl PostProcessor {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            generated_at: Local::now(),
            preview: None,
        }
    }

    /// Validate `options` and build a post-processor from them
    pub fn from_options(options: &ExportOptions) -> PostResult<Self> {
        Ok(Self::new(SessionConfig::resolve(options)?))
    }

    /// Pin the timestamp written to the header
    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Attach a base64-encoded PNG preview for the header thumbnail
    pub fn with_preview(mut self, base64_png: impl Into<String>) -> Self {
        self.preview = Some(base64_png.into());
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Build the annotated output records for `job`
    pub fn build(&self, job: &Job) -> PostResult<GcodeProgram> {
        info!(
            "Post-processing '{}' ({} operations)",
            job.name,
            job.operations.len()
        );
        let config = &self.config;
        let mut out = GcodeProgram::new();

        if config.output_header {
            self.write_header(&mut out);
        }
        out.push_text(config.units_command());

        let mut translator = Translator::new(config);
        for operation in &job.operations {
            if !operation.is_active() {
                info!("Skipping inactive operation '{}'", operation.label);
                continue;
            }
            debug!("Operation '{}'", operation.label);
            out.push_text(&config.pre_operation);
            translator.translate(&operation.program, &mut out)?;
            if config.output_comments {
                out.push_comment(format!("finish operation: {}", operation.label));
            }
            out.push_text(&config.post_operation);
        }

        if config.output_comments {
            out.push_comment("begin postamble");
        }
        out.push_text(&config.postamble);

        if translator.skipped_commands() > 0 {
            debug!(
                "{} commands produced no output",
                translator.skipped_commands()
            );
        }

        if let Err(e) = boundary::annotate(&mut out, config.length_label()) {
            warn!("Boundary block omitted: {}", e);
        }

        Ok(out)
    }

    /// Export `job` to G-code text
    pub fn export(&self, job: &Job) -> PostResult<String> {
        let program = self.build(job)?;
        let line_numbers = self
            .config
            .output_line_numbers
            .then_some(self.config.line_number_start);
        let text = program.render(line_numbers);
        info!("Post-processing done: {} lines", program.len());
        Ok(text)
    }

    fn write_header(&self, out: &mut GcodeProgram) {
        let config = &self.config;
        out.push_comment("Exported for Snapmaker 2");
        out.push_comment(format!(
            "Post Processor: {} {}",
            POST_PROCESSOR_NAME, POST_PROCESSOR_VERSION
        ));
        out.push_comment(format!(
            "Output Time:{}",
            self.generated_at.format(TIMESTAMP_FORMAT)
        ));

        out.push_comment("Header Start");
        out.push_comment("header_type: cnc");
        if let Some(profile) = &config.profile {
            out.push_comment(format!("tool_head: {}", profile.label));
        }
        out.push_comment(format!("machine: {}", config.machine_name));
        out.push_comment("gcode_flavor: marlin");
        out.mark_boundary_anchor();
        if let Some(preview) = &self.preview {
            out.push_comment(format!("thumbnail: data:image/png;base64,{}", preview));
        }
        out.push_comment("Header End");

        out.push_text(&config.preamble);
        out.push_instruction(
            Instruction::new("G0")
                .with_word(Word::fixed(
                    'Z',
                    config.length_from_program(SAFE_RETRACT_Z),
                    config.precision,
                ))
                .with_word(Word::fixed(
                    'F',
                    convert_feed_rate(
                        SAFE_RETRACT_FEED,
                        FeedRateUnits::MmPerMin,
                        config.speed_units(),
                    ),
                    config.precision,
                )),
        );
    }
}

/// Export `job` with options given as a post-processor argument string
pub fn export(job: &Job, args: &str) -> PostResult<String> {
    let options = ExportOptions::from_arg_string(args)?;
    PostProcessor::from_options(&options)?.export(job)
}
