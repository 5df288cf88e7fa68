//! Motion program model
//!
//! The abstract, hierarchical program handed over by the CAM host: commands
//! with single-letter parameters, nested into groups and operations.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One command of the motion program, e.g. `G1 X10 Y5 F20`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolpathCommand {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_parameters")]
    pub parameters: BTreeMap<char, f64>,
}

/// Parameter letters are stored upper-case. Non-letters and letters given
/// twice in different case are rejected.
fn deserialize_parameters<'de, D>(deserializer: D) -> Result<BTreeMap<char, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = BTreeMap::<char, f64>::deserialize(deserializer)?;
    let mut parameters = BTreeMap::new();
    for (letter, value) in raw {
        if !letter.is_ascii_alphabetic() {
            return Err(D::Error::custom(format!(
                "invalid parameter letter '{}'",
                letter
            )));
        }
        let letter = letter.to_ascii_uppercase();
        if parameters.insert(letter, value).is_some() {
            return Err(D::Error::custom(format!(
                "parameter {} given more than once",
                letter
            )));
        }
    }
    Ok(parameters)
}

impl ToolpathCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder-style parameter setter
    pub fn with(mut self, letter: char, value: f64) -> Self {
        self.parameters.insert(letter.to_ascii_uppercase(), value);
        self
    }

    /// Value of a parameter, if present
    pub fn param(&self, letter: char) -> Option<f64> {
        self.parameters.get(&letter).copied()
    }

    pub fn has(&self, letter: char) -> bool {
        self.parameters.contains_key(&letter)
    }

    /// Classify the command by its name
    pub fn kind(&self) -> CommandKind {
        CommandKind::from_name(&self.name)
    }
}

/// Drilling cycle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillCycle {
    /// G81
    Simple,
    /// G82
    Dwell,
    /// G83
    Pecked,
}

/// Translation-relevant classification of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Comment,
    Rapid,
    Linear,
    ArcClockwise,
    ArcCounterClockwise,
    Spline,
    Drill(DrillCycle),
    SpindleOn,
    SpindleOff,
    Raw,
}

impl CommandKind {
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.starts_with('(') {
            return Self::Comment;
        }
        match canonical_mnemonic(name).as_str() {
            "G0" => Self::Rapid,
            "G1" => Self::Linear,
            "G2" => Self::ArcClockwise,
            "G3" => Self::ArcCounterClockwise,
            "G5" => Self::Spline,
            "G81" => Self::Drill(DrillCycle::Simple),
            "G82" => Self::Drill(DrillCycle::Dwell),
            "G83" => Self::Drill(DrillCycle::Pecked),
            "M3" => Self::SpindleOn,
            "M5" => Self::SpindleOff,
            _ => Self::Raw,
        }
    }

    /// Whether the command is discretized into linear moves
    pub fn is_motion(self) -> bool {
        matches!(
            self,
            Self::Rapid
                | Self::Linear
                | Self::ArcClockwise
                | Self::ArcCounterClockwise
                | Self::Spline
        )
    }
}

/// Upper-case a mnemonic and strip leading zeros from its number
/// (`g01` → `G1`, `M03` → `M3`). Non-numeric suffixes are kept as is.
pub fn canonical_mnemonic(name: &str) -> String {
    let name = name.trim().to_ascii_uppercase();
    let mut chars = name.chars();
    match chars.next() {
        Some(letter) if letter.is_ascii_alphabetic() => {
            let number = chars.as_str();
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit() || c == '.') {
                let trimmed = number.trim_start_matches('0');
                let trimmed = if trimmed.is_empty() || trimmed.starts_with('.') {
                    format!("0{}", trimmed)
                } else {
                    trimmed.to_string()
                };
                format!("{}{}", letter, trimmed)
            } else {
                name
            }
        }
        _ => name,
    }
}

/// A node of the motion program tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolpathNode {
    Command(ToolpathCommand),
    Group(ToolpathGroup),
}

/// Ordered sequence of commands and nested groups
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolpathGroup {
    #[serde(default)]
    pub label: Option<String>,
    pub children: Vec<ToolpathNode>,
}

impl ToolpathGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group holding the given commands in order
    pub fn from_commands(commands: impl IntoIterator<Item = ToolpathCommand>) -> Self {
        Self {
            label: None,
            children: commands.into_iter().map(ToolpathNode::Command).collect(),
        }
    }

    pub fn push_command(&mut self, command: ToolpathCommand) {
        self.children.push(ToolpathNode::Command(command));
    }

    pub fn push_group(&mut self, group: ToolpathGroup) {
        self.children.push(ToolpathNode::Group(group));
    }

    /// Total number of commands, nested groups included
    pub fn command_count(&self) -> usize {
        self.children
            .iter()
            .map(|node| match node {
                ToolpathNode::Command(_) => 1,
                ToolpathNode::Group(group) => group.command_count(),
            })
            .sum()
    }
}

fn default_true() -> bool {
    true
}

/// One CAM operation of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub label: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Activity of the operation this one is based on, when the host tracks it
    #[serde(default)]
    pub base_active: Option<bool>,
    pub program: ToolpathGroup,
}

impl Operation {
    pub fn new(label: impl Into<String>, program: ToolpathGroup) -> Self {
        Self {
            label: label.into(),
            active: true,
            base_active: None,
            program,
        }
    }

    /// Inactive operations, or operations whose base is inactive, are skipped
    pub fn is_active(&self) -> bool {
        self.active && self.base_active.unwrap_or(true)
    }
}

/// A complete job: the operations to export, in order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub operations: Vec<Operation>,
}

impl Job {
    /// Parse a job from JSON
    pub fn from_json_str(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}
