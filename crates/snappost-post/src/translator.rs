//! Command translator
//!
//! Walks a motion program depth-first and turns every command into output
//! records the Snapmaker controller understands. All state that depends on
//! earlier commands (head position, feed rates, last motion mnemonic) lives in
//! one [`MachineState`] owned by the translator, so commands must be fed in
//! program order.

use crate::config::SessionConfig;
use crate::discretizer::{Discretizer, Edge};
use crate::drill_cycle::{DrillCycleExpander, DrillStep};
use crate::error::{PostError, PostResult};
use crate::line::{GcodeProgram, Instruction, Word};
use crate::program::{canonical_mnemonic, CommandKind, ToolpathCommand, ToolpathGroup, ToolpathNode};
use crate::spindle::SpindlePowerMapper;
use snappost_core::Position;
use std::collections::HashMap;
use tracing::debug;

/// Emission order for parameters of commands passed through unchanged.
/// Letters not listed follow in alphabetical order.
const PARAMETER_ORDER: [char; 18] = [
    'X', 'Y', 'Z', 'A', 'B', 'C', 'I', 'J', 'K', 'F', 'S', 'T', 'Q', 'R', 'L', 'H', 'D', 'P',
];

/// Parameters holding linear distances
const LENGTH_LETTERS: [char; 8] = ['X', 'Y', 'Z', 'I', 'J', 'K', 'R', 'Q'];

/// Parameters holding rotary axis positions
const ROTARY_LETTERS: [char; 3] = ['A', 'B', 'C'];

const LINEAR_MOVE: &str = "G1";
const DWELL: &str = "G4";
const SPINDLE_ON: &str = "M3";

/// Machine state carried from one command to the next
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    /// Last commanded head position, program units
    pub position: Position,
    /// Feed for horizontal moves, session speed unit
    pub feed_horizontal: f64,
    /// Feed for moves with vertical travel, session speed unit
    pub feed_vertical: f64,
    /// Mnemonic of the last emitted motion line
    pub last_motion_mnemonic: Option<String>,
    /// Rendered text of the last X/Y/Z/F words, for axis-modal output
    last_words: HashMap<char, String>,
}

impl MachineState {
    fn new(config: &SessionConfig) -> Self {
        Self {
            position: Position::default(),
            feed_horizontal: config.default_feed_horizontal,
            feed_vertical: config.default_feed_vertical,
            last_motion_mnemonic: None,
            last_words: HashMap::new(),
        }
    }

    /// Feed for a move towards `z`, or a move without Z when `z` is `None`
    fn adaptive_feed(&self, z: Option<f64>) -> f64 {
        match z {
            Some(z) if z != self.position.z => self.feed_vertical.min(self.feed_horizontal),
            _ => self.feed_horizontal,
        }
    }
}

/// Stateful translator for one export
#[derive(Debug)]
pub struct Translator<'a> {
    config: &'a SessionConfig,
    state: MachineState,
    discretizer: Discretizer,
    skipped: usize,
}

impl<'a> Translator<'a> {
    pub fn new(config: &'a SessionConfig) -> Self {
        Self {
            config,
            state: MachineState::new(config),
            discretizer: Discretizer::new(config.segments_per_cm, config.break_straights),
            skipped: 0,
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Commands dropped because their geometry could not be built
    pub fn skipped_commands(&self) -> usize {
        self.skipped
    }

    /// Translate a group and everything nested in it, in order
    pub fn translate(&mut self, group: &ToolpathGroup, out: &mut GcodeProgram) -> PostResult<()> {
        if let Some(label) = &group.label {
            debug!("=== {} ===", label);
        }
        for node in &group.children {
            match node {
                ToolpathNode::Command(command) => self.translate_command(command, out)?,
                ToolpathNode::Group(inner) => self.translate(inner, out)?,
            }
        }
        Ok(())
    }

    /// Translate a single command
    pub fn translate_command(
        &mut self,
        command: &ToolpathCommand,
        out: &mut GcodeProgram,
    ) -> PostResult<()> {
        debug!("Next: {} {:?}", command.name, command.parameters);
        let kind = command.kind();

        if kind == CommandKind::Comment {
            if self.config.output_comments {
                out.push_comment(command.name.trim());
            }
            return Ok(());
        }

        self.classify_feed(command);

        match kind {
            CommandKind::Drill(_) => {
                self.emit_drill_cycle(command, out)?;
                return Ok(());
            }
            k if k.is_motion() => self.emit_motion(command, out),
            CommandKind::SpindleOn => self.emit_spindle_on(command, out)?,
            _ => self.emit_raw(command, out),
        }

        self.state.position = self.state.position.with_axes(
            command.param('X'),
            command.param('Y'),
            command.param('Z'),
        );
        Ok(())
    }

    /// Store a positive F as the vertical feed when the command changes Z,
    /// otherwise as the horizontal feed
    fn classify_feed(&mut self, command: &ToolpathCommand) {
        let Some(raw) = command.param('F') else {
            return;
        };
        let feed = self.config.feed_from_program(raw);
        if feed <= 0.0 {
            return;
        }
        match command.param('Z') {
            Some(z) if z != self.state.position.z => {
                if self.state.feed_vertical != feed {
                    debug!("New vertical feedrate {}", feed);
                }
                self.state.feed_vertical = feed;
            }
            _ => {
                if self.state.feed_horizontal != feed {
                    debug!("New horizontal feedrate {}", feed);
                }
                self.state.feed_horizontal = feed;
            }
        }
    }

    fn emit_motion(&mut self, command: &ToolpathCommand, out: &mut GcodeProgram) {
        let Some(edge) = Edge::for_command(command, &self.state.position) else {
            debug!("Skipping {}: no usable geometry", command.name);
            self.skipped += 1;
            return;
        };

        let points = self.discretizer.discretize(&edge);
        let feed = self.state.adaptive_feed(command.param('Z'));
        for point in &points {
            self.emit_linear(point, feed, out);
        }
        debug!("Broke {} into {} segments", command.name, points.len());
    }

    fn emit_drill_cycle(
        &mut self,
        command: &ToolpathCommand,
        out: &mut GcodeProgram,
    ) -> PostResult<()> {
        let expansion = DrillCycleExpander::new(self.config).expand(
            command,
            &self.state.position,
            self.state.feed_horizontal,
            self.state.feed_vertical,
        )?;

        for step in &expansion.steps {
            match step {
                DrillStep::Move { target, feed } => self.emit_linear(target, *feed, out),
                DrillStep::Dwell { millis } => out.push_instruction(
                    Instruction::new(DWELL).with_word(Word::fixed('P', *millis, 0)),
                ),
            }
        }
        debug!(
            "Expanded {} into {} steps ({} pecks)",
            command.name,
            expansion.steps.len(),
            expansion.peck_count
        );

        self.state.position = expansion.end_position;
        Ok(())
    }

    fn emit_spindle_on(
        &mut self,
        command: &ToolpathCommand,
        out: &mut GcodeProgram,
    ) -> PostResult<()> {
        let rpm = command
            .param('S')
            .ok_or_else(|| PostError::MissingParameter {
                command: command.name.clone(),
                parameter: 'S',
            })?;
        let power = SpindlePowerMapper::new(self.config.profile.as_ref()).power_for(rpm)?;
        out.push_instruction(Instruction::new(SPINDLE_ON).with_word(Word::fixed('P', power, 0)));
        Ok(())
    }

    fn emit_raw(&mut self, command: &ToolpathCommand, out: &mut GcodeProgram) {
        let mut instruction = Instruction::new(canonical_mnemonic(&command.name));
        let ordered = PARAMETER_ORDER
            .iter()
            .copied()
            .filter(|letter| command.has(*letter))
            .chain(
                command
                    .parameters
                    .keys()
                    .copied()
                    .filter(|letter| !PARAMETER_ORDER.contains(letter)),
            );
        for letter in ordered {
            if let Some(value) = command.param(letter) {
                instruction.words.push(self.raw_word(letter, value));
            }
        }
        out.push_instruction(instruction);
    }

    fn raw_word(&self, letter: char, value: f64) -> Word {
        let precision = self.config.precision;
        if LENGTH_LETTERS.contains(&letter) {
            Word::fixed(letter, self.config.length_from_program(value), precision)
        } else if ROTARY_LETTERS.contains(&letter) {
            Word::fixed(letter, value, precision)
        } else if letter == 'F' {
            Word::fixed(letter, self.config.feed_from_program(value), precision)
        } else {
            Word::plain(letter, value)
        }
    }

    /// Emit `G1` to `target` at `feed`, applying modal and axis-modal output
    fn emit_linear(&mut self, target: &Position, feed: f64, out: &mut GcodeProgram) {
        let precision = self.config.precision;
        let mut instruction = Instruction::new(LINEAR_MOVE)
            .with_word(Word::fixed('X', self.config.length_from_program(target.x), precision))
            .with_word(Word::fixed('Y', self.config.length_from_program(target.y), precision))
            .with_word(Word::fixed('Z', self.config.length_from_program(target.z), precision))
            .with_word(Word::fixed('F', feed, precision));

        if self.config.modal
            && self.state.last_motion_mnemonic.as_deref() == Some(instruction.mnemonic.as_str())
        {
            instruction.suppressed = true;
        }
        self.state.last_motion_mnemonic = Some(instruction.mnemonic.clone());

        if self.config.axis_modal {
            let last_words = &mut self.state.last_words;
            instruction.words.retain(|word| {
                let repeated = last_words.get(&word.letter).map(String::as_str) == Some(word.text());
                last_words.insert(word.letter, word.text().to_string());
                !repeated
            });
        }

        if !instruction.is_noop() {
            out.push_instruction(instruction);
        }
    }
}
