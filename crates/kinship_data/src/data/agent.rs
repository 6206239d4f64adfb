use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identification of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
}

impl Identity {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

/// World position of an agent. `y` is height; the ground plane is X/Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Position on the ground plane (`y = 0`).
    pub fn planar(x: f64, z: f64) -> Self {
        Self { x, y: 0.0, z }
    }

    #[inline]
    pub fn planar_distance_sq(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    #[inline]
    pub fn distance_sq(&self, other: &Position) -> f64 {
        let dy = self.y - other.y;
        self.planar_distance_sq(other) + dy * dy
    }
}
