//! Position data model
//!
//! Three-axis head positions in program units (millimetres).

use serde::{Deserialize, Serialize};

/// Three-axis head position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Linear interpolation towards `other`; `t` = 0 is `self`, `t` = 1 is `other`
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Replace the axes that are present, keep the others
    pub fn with_axes(&self, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Position {
        Position {
            x: x.unwrap_or(self.x),
            y: y.unwrap_or(self.y),
            z: z.unwrap_or(self.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Position::new(1.0, 2.0, 3.0);
        let b = Position::new(5.0, 6.0, -1.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Position::new(3.0, 4.0, 1.0));
    }

    #[test]
    fn test_partial_update_keeps_missing_axes() {
        let p = Position::new(1.0, 2.0, 3.0);
        assert_eq!(p.with_axes(Some(9.0), None, None), Position::new(9.0, 2.0, 3.0));
        assert_eq!(p.with_axes(None, None, None), p);
    }
}
