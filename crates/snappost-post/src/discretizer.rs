//! Geometric discretizer
//!
//! Turns a single straight or arc move into the ordered points the target
//! controller can follow with linear moves. Arcs lie in the XY plane; a Z
//! change along an arc becomes a helix.

use crate::program::{CommandKind, ToolpathCommand};
use snappost_core::Position;
use std::f64::consts::PI;

/// Below this length (mm) or radius an edge is degenerate
const GEOMETRY_EPSILON: f64 = 1e-9;

/// Path of one move, from the current head position to the command target
#[derive(Debug, Clone, PartialEq)]
pub enum Edge {
    Line {
        start: Position,
        end: Position,
    },
    Arc {
        start: Position,
        end: Position,
        center_x: f64,
        center_y: f64,
        radius: f64,
        start_angle: f64,
        /// Signed sweep in radians; negative is clockwise
        sweep: f64,
    },
}

impl Edge {
    /// Build the edge a motion command traces from `current`. Returns `None`
    /// for degenerate or unsupported geometry.
    pub fn for_command(command: &ToolpathCommand, current: &Position) -> Option<Edge> {
        let end = current.with_axes(command.param('X'), command.param('Y'), command.param('Z'));
        match command.kind() {
            CommandKind::Rapid | CommandKind::Linear => Self::line(*current, end),
            CommandKind::ArcClockwise => Self::arc(
                *current,
                end,
                command.param('I').unwrap_or(0.0),
                command.param('J').unwrap_or(0.0),
                true,
            ),
            CommandKind::ArcCounterClockwise => Self::arc(
                *current,
                end,
                command.param('I').unwrap_or(0.0),
                command.param('J').unwrap_or(0.0),
                false,
            ),
            _ => None,
        }
    }

    /// Straight segment; `None` when start and end coincide
    pub fn line(start: Position, end: Position) -> Option<Edge> {
        if start.distance_to(&end) < GEOMETRY_EPSILON {
            return None;
        }
        Some(Edge::Line { start, end })
    }

    /// XY-plane arc with centre at `start + (offset_x, offset_y)`. Equal start
    /// and end XY describe a full circle.
    pub fn arc(
        start: Position,
        end: Position,
        offset_x: f64,
        offset_y: f64,
        is_clockwise: bool,
    ) -> Option<Edge> {
        let center_x = start.x + offset_x;
        let center_y = start.y + offset_y;

        let radius = (offset_x * offset_x + offset_y * offset_y).sqrt();
        if radius < GEOMETRY_EPSILON {
            return None;
        }

        let start_angle = (start.y - center_y).atan2(start.x - center_x);
        let end_angle = (end.y - center_y).atan2(end.x - center_x);

        let mut sweep = end_angle - start_angle;
        if is_clockwise && sweep >= -GEOMETRY_EPSILON {
            sweep -= 2.0 * PI;
        } else if !is_clockwise && sweep <= GEOMETRY_EPSILON {
            sweep += 2.0 * PI;
        }

        Some(Edge::Arc {
            start,
            end,
            center_x,
            center_y,
            radius,
            start_angle,
            sweep,
        })
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, Edge::Line { .. })
    }

    /// Path length in program units (mm)
    pub fn length(&self) -> f64 {
        match self {
            Edge::Line { start, end } => start.distance_to(end),
            Edge::Arc {
                start,
                end,
                radius,
                sweep,
                ..
            } => {
                let planar = radius * sweep.abs();
                let dz = end.z - start.z;
                (planar * planar + dz * dz).sqrt()
            }
        }
    }

    /// Point at parameter `t` in `[0, 1]`
    pub fn point_at(&self, t: f64) -> Position {
        match self {
            Edge::Line { start, end } => start.lerp(end, t),
            Edge::Arc {
                start,
                end,
                center_x,
                center_y,
                radius,
                start_angle,
                sweep,
            } => {
                let angle = start_angle + sweep * t;
                Position::new(
                    center_x + radius * angle.cos(),
                    center_y + radius * angle.sin(),
                    start.z + (end.z - start.z) * t,
                )
            }
        }
    }

    fn end(&self) -> Position {
        match self {
            Edge::Line { end, .. } | Edge::Arc { end, .. } => *end,
        }
    }
}

/// Splits edges into evenly spaced points
#[derive(Debug, Clone)]
pub struct Discretizer {
    segments_per_cm: f64,
    break_straights: bool,
}

impl Discretizer {
    pub fn new(segments_per_cm: f64, break_straights: bool) -> Self {
        Self {
            segments_per_cm,
            break_straights,
        }
    }

    /// Number of points describing `edge`, start point included
    pub fn point_count(&self, edge: &Edge) -> usize {
        if edge.is_straight() && !self.break_straights {
            return 2;
        }
        let segments = (edge.length() * self.segments_per_cm / 10.0).ceil();
        1 + segments.max(1.0) as usize
    }

    /// Points along `edge`, start excluded and endpoint included. The final
    /// point is always the exact commanded endpoint.
    pub fn discretize(&self, edge: &Edge) -> Vec<Position> {
        let count = self.point_count(edge);
        let segments = count - 1;
        let mut points: Vec<Position> = (1..segments)
            .map(|i| edge.point_at(i as f64 / segments as f64))
            .collect();
        points.push(edge.end());
        points
    }
}
