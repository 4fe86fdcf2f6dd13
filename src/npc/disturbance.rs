//! Last known point of interest for an NPC

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An NPC's memory of where something suspicious happened
///
/// Unset until the first detection or interaction. Reads always report the
/// point at the reader's own elevation so a search target never floats off
/// the walkable surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceMemory {
    point: Option<Vec3>,
}

impl DisturbanceMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything has been remembered yet
    pub fn is_set(&self) -> bool {
        self.point.is_some()
    }

    /// The raw remembered point, without elevation projection
    pub fn raw(&self) -> Option<Vec3> {
        self.point
    }

    /// Remember a new point of interest
    pub fn set(&mut self, point: Vec3) {
        self.point = Some(point);
    }

    /// Read the point for an NPC standing at `reader`
    ///
    /// If nothing was remembered yet the player's position is adopted and
    /// returned unprojected.
    pub fn get(&mut self, reader: Vec3, player: Vec3) -> Vec3 {
        match self.point {
            Some(point) => Vec3::new(point.x, reader.y, point.z),
            None => {
                self.point = Some(player);
                player
            }
        }
    }

    /// Read without lazy initialization
    pub fn peek(&self, reader: Vec3) -> Option<Vec3> {
        self.point.map(|p| Vec3::new(p.x, reader.y, p.z))
    }
}
