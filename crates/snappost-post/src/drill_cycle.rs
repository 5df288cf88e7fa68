//! Drill-cycle expander
//!
//! The target controller has no canned drilling cycles, so G81/G82/G83 are
//! rewritten as explicit linear moves plus an optional dwell.

use crate::config::SessionConfig;
use crate::error::{PostError, PostResult};
use crate::program::ToolpathCommand;
use snappost_core::Position;

/// Upper bound on pecks for a single hole
pub const MAX_PECK_COUNT: usize = 10_000;

/// One step of an expanded drilling cycle
#[derive(Debug, Clone, PartialEq)]
pub enum DrillStep {
    /// Linear move to `target` (program units) at `feed` (session speed unit)
    Move { target: Position, feed: f64 },
    /// Pause in the finished hole
    Dwell { millis: f64 },
}

/// Result of expanding one drilling command
#[derive(Debug, Clone, PartialEq)]
pub struct DrillExpansion {
    pub steps: Vec<DrillStep>,
    /// Head position once the cycle is complete
    pub end_position: Position,
    pub peck_count: usize,
}

/// Expands drilling commands against the current head state
#[derive(Debug)]
pub struct DrillCycleExpander<'a> {
    config: &'a SessionConfig,
}

impl<'a> DrillCycleExpander<'a> {
    pub fn new(config: &'a SessionConfig) -> Self {
        Self { config }
    }

    /// Expand `command` from `current` using the given feed rates.
    pub fn expand(
        &self,
        command: &ToolpathCommand,
        current: &Position,
        feed_horizontal: f64,
        feed_vertical: f64,
    ) -> PostResult<DrillExpansion> {
        let x = command.param('X').unwrap_or(current.x);
        let y = command.param('Y').unwrap_or(current.y);
        let target_z = required(command, 'Z')?;
        let retract_z = required(command, 'R')?;
        let retract_feed = feed_vertical * self.config.hole_retract_factor;

        let peck_depth = command.param('Q').filter(|q| *q > 0.0);
        let peck_count = match peck_depth {
            Some(q) => {
                let pecks = ((current.z - target_z) / q).floor().max(0.0);
                if !pecks.is_finite() || pecks > MAX_PECK_COUNT as f64 {
                    return Err(PostError::InvalidParameter {
                        command: command.name.clone(),
                        parameter: 'Q',
                        reason: format!(
                            "peck depth {} needs more than {} pecks",
                            q, MAX_PECK_COUNT
                        ),
                    });
                }
                pecks as usize
            }
            None => 0,
        };

        // Dwell is emitted in whole milliseconds
        let dwell_ms = resolve_dwell_ms(command).round();

        let over_hole = DrillStep::Move {
            target: Position::new(x, y, current.z),
            feed: feed_horizontal,
        };
        let leave_hole = DrillStep::Move {
            target: Position::new(x, y, retract_z),
            feed: retract_feed,
        };

        let mut steps = vec![over_hole.clone()];

        if let Some(q) = peck_depth {
            for peck in 1..=peck_count {
                steps.push(DrillStep::Move {
                    target: Position::new(x, y, current.z - peck as f64 * q),
                    feed: feed_vertical,
                });
                steps.push(leave_hole.clone());
            }
        }

        steps.push(DrillStep::Move {
            target: Position::new(x, y, target_z),
            feed: feed_vertical,
        });

        if dwell_ms > 0.0 {
            steps.push(DrillStep::Dwell { millis: dwell_ms });
        }

        steps.push(leave_hole);

        let end_position = if self.config.move_drill_in_retract_height {
            Position::new(x, y, retract_z)
        } else {
            steps.push(over_hole);
            Position::new(x, y, current.z)
        };

        Ok(DrillExpansion {
            steps,
            end_position,
            peck_count,
        })
    }
}

/// Dwell time in milliseconds. S (seconds) takes precedence over P
/// (milliseconds) whenever it is present.
fn resolve_dwell_ms(command: &ToolpathCommand) -> f64 {
    match (command.param('S'), command.param('P')) {
        (Some(seconds), _) => seconds * 1000.0,
        (None, Some(millis)) => millis,
        (None, None) => 0.0,
    }
}

fn required(command: &ToolpathCommand, letter: char) -> PostResult<f64> {
    command
        .param(letter)
        .ok_or_else(|| PostError::MissingParameter {
            command: command.name.clone(),
            parameter: letter,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_zs(expansion: &DrillExpansion) -> Vec<f64> {
        expansion
            .steps
            .iter()
            .filter_map(|s| match s {
                DrillStep::Move { target, .. } => Some(target.z),
                DrillStep::Dwell { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_simple_cycle() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let cmd = ToolpathCommand::new("G81")
            .with('X', 10.0)
            .with('Y', 20.0)
            .with('Z', -5.0)
            .with('R', 2.0);
        let result = expander
            .expand(&cmd, &Position::new(0.0, 0.0, 5.0), 600.0, 300.0)
            .unwrap();

        assert_eq!(result.peck_count, 0);
        assert_eq!(
            result.steps,
            vec![
                DrillStep::Move {
                    target: Position::new(10.0, 20.0, 5.0),
                    feed: 600.0
                },
                DrillStep::Move {
                    target: Position::new(10.0, 20.0, -5.0),
                    feed: 300.0
                },
                DrillStep::Move {
                    target: Position::new(10.0, 20.0, 2.0),
                    feed: 3000.0
                },
                DrillStep::Move {
                    target: Position::new(10.0, 20.0, 5.0),
                    feed: 600.0
                },
            ]
        );
        assert_eq!(result.end_position, Position::new(10.0, 20.0, 5.0));
    }

    #[test]
    fn test_peck_cycle() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let cmd = ToolpathCommand::new("G83")
            .with('X', 0.0)
            .with('Y', 0.0)
            .with('Z', -10.0)
            .with('R', 1.0)
            .with('Q', 3.0);
        let result = expander
            .expand(&cmd, &Position::default(), 600.0, 300.0)
            .unwrap();

        assert_eq!(result.peck_count, 3);
        assert_eq!(
            target_zs(&result),
            vec![0.0, -3.0, 1.0, -6.0, 1.0, -9.0, 1.0, -10.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_dwell_precedence() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let base = ToolpathCommand::new("G82").with('Z', -1.0).with('R', 1.0);

        let millis = base.clone().with('P', 250.0);
        let result = expander.expand(&millis, &Position::default(), 1.0, 1.0).unwrap();
        assert!(result.steps.contains(&DrillStep::Dwell { millis: 250.0 }));

        let both = base.clone().with('P', 250.0).with('S', 0.5);
        let result = expander.expand(&both, &Position::default(), 1.0, 1.0).unwrap();
        assert!(result.steps.contains(&DrillStep::Dwell { millis: 500.0 }));

        let result = expander.expand(&base, &Position::default(), 1.0, 1.0).unwrap();
        assert!(!result
            .steps
            .iter()
            .any(|s| matches!(s, DrillStep::Dwell { .. })));
    }

    #[test]
    fn test_retract_height_mode_keeps_drill_up() {
        let config = SessionConfig {
            move_drill_in_retract_height: true,
            ..Default::default()
        };
        let expander = DrillCycleExpander::new(&config);
        let cmd = ToolpathCommand::new("G81")
            .with('X', 3.0)
            .with('Y', 4.0)
            .with('Z', -2.0)
            .with('R', 1.5);
        let result = expander
            .expand(&cmd, &Position::new(0.0, 0.0, 5.0), 600.0, 300.0)
            .unwrap();
        assert_eq!(result.steps.len(), 3);
        assert_eq!(result.end_position, Position::new(3.0, 4.0, 1.5));
    }

    #[test]
    fn test_missing_retract_height() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let cmd = ToolpathCommand::new("G81").with('Z', -2.0);
        let err = expander
            .expand(&cmd, &Position::default(), 600.0, 300.0)
            .unwrap_err();
        assert!(matches!(
            err,
            PostError::MissingParameter { parameter: 'R', .. }
        ));
    }

    #[test]
    fn test_tiny_peck_depth_is_rejected() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let cmd = ToolpathCommand::new("G83")
            .with('Z', -10.0)
            .with('R', 1.0)
            .with('Q', 1e-12);
        let err = expander
            .expand(&cmd, &Position::default(), 600.0, 300.0)
            .unwrap_err();
        assert!(matches!(
            err,
            PostError::InvalidParameter { parameter: 'Q', .. }
        ));

        // Exactly at the limit is still accepted
        let cmd = ToolpathCommand::new("G83")
            .with('Z', -10.0)
            .with('R', 1.0)
            .with('Q', 0.001);
        let result = expander
            .expand(&cmd, &Position::default(), 600.0, 300.0)
            .unwrap();
        assert!(result.peck_count <= MAX_PECK_COUNT);
    }

    #[test]
    fn test_dwell_rounds_to_whole_milliseconds() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let base = ToolpathCommand::new("G82").with('Z', -1.0).with('R', 1.0);

        let result = expander
            .expand(&base.clone().with('P', 0.3), &Position::default(), 1.0, 1.0)
            .unwrap();
        assert!(!result
            .steps
            .iter()
            .any(|s| matches!(s, DrillStep::Dwell { .. })));

        let result = expander
            .expand(&base.with('S', 0.0126), &Position::default(), 1.0, 1.0)
            .unwrap();
        assert!(result.steps.contains(&DrillStep::Dwell { millis: 13.0 }));
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let cmd = ToolpathCommand::new("G83")
            .with('X', 4.0)
            .with('Y', -2.0)
            .with('Z', -7.5)
            .with('R', 0.5)
            .with('Q', 2.0)
            .with('P', 250.0);
        let start = Position::new(1.0, 1.0, 3.0);
        let first = expander.expand(&cmd, &start, 600.0, 300.0).unwrap();
        let second = expander.expand(&cmd, &start, 600.0, 300.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_target_above_head_has_no_pecks() {
        let config = SessionConfig::default();
        let expander = DrillCycleExpander::new(&config);
        let cmd = ToolpathCommand::new("G83")
            .with('Z', 5.0)
            .with('R', 6.0)
            .with('Q', 1.0);
        let result = expander
            .expand(&cmd, &Position::default(), 600.0, 300.0)
            .unwrap();
        assert_eq!(result.peck_count, 0);
    }
}
