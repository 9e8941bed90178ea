//! World positions.

use serde::{Deserialize, Serialize};

/// A point in world space, in distance units (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// East-west axis.
    pub x: f64,
    /// Vertical axis.
    pub y: f64,
    /// North-south axis.
    pub z: f64,
}

impl Position {
    /// Create a new position.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Move at most `step` units toward `goal`, stopping on it.
    pub fn step_towards(&self, goal: &Self, step: f64) -> Self {
        let distance = self.distance_to(goal);
        if distance <= step || distance <= f64::EPSILON {
            return *goal;
        }
        let t = step / distance;
        Self {
            x: self.x + (goal.x - self.x) * t,
            y: self.y + (goal.y - self.y) * t,
            z: self.z + (goal.z - self.z) * t,
        }
    }
}
