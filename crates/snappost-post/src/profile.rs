//! Toolhead profiles
//!
//! Spindle capability descriptors for the Snapmaker 2 CNC toolheads.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported toolhead variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Toolhead {
    /// Standard 50W CNC toolhead
    #[default]
    Standard,
    /// 200W level-two CNC toolhead
    LevelTwo,
}

impl Toolhead {
    /// Capability descriptor for this toolhead
    pub fn profile(self) -> MachineProfile {
        match self {
            Self::Standard => MachineProfile {
                label: "standardCNCToolheadForSM2".to_string(),
                min_spindle_rpm: 6000.0,
                max_spindle_rpm: 12000.0,
                min_spindle_power: 50.0,
                max_spindle_power: 100.0,
            },
            Self::LevelTwo => MachineProfile {
                label: "levelTwoCNCToolheadForSM2".to_string(),
                min_spindle_rpm: 8000.0,
                max_spindle_rpm: 18000.0,
                min_spindle_power: 0.0,
                max_spindle_power: 100.0,
            },
        }
    }
}

impl fmt::Display for Toolhead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::LevelTwo => write!(f, "level_two"),
        }
    }
}

impl FromStr for Toolhead {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "standard" | "standardcnctoolheadforsm2" => Ok(Self::Standard),
            "level_two" | "leveltwo" | "leveltwocnc" | "leveltwocnctoolheadforsm2" => {
                Ok(Self::LevelTwo)
            }
            _ => Err(ConfigurationError::UnknownToolhead(s.to_string())),
        }
    }
}

impl TryFrom<String> for Toolhead {
    type Error = ConfigurationError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Spindle capability descriptor for one toolhead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineProfile {
    /// Identifier written into the `;tool_head:` header line
    pub label: String,
    pub min_spindle_rpm: f64,
    pub max_spindle_rpm: f64,
    /// Spindle power bounds in percent
    pub min_spindle_power: f64,
    pub max_spindle_power: f64,
}
