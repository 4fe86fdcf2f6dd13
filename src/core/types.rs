//! Core type definitions used throughout the codebase

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unique identifier for NPCs within a night's roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(pub u32);

impl NpcId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// World up axis. Ground positions vary in x and z.
pub const UP: Vec3 = Vec3::Y;

/// Tolerance under which two destinations count as the same point
pub const POINT_EPSILON: f32 = 1e-5;

/// Same point within [`POINT_EPSILON`] on every axis
pub fn same_point(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, POINT_EPSILON)
}

/// Yaw (radians, clockwise from +Z seen from above) of a direction
pub fn yaw_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

/// Unit ground-plane direction for a yaw
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Right-hand vector of a ground-plane facing
pub fn right_of(forward: Vec3) -> Vec3 {
    UP.cross(forward).normalize_or_zero()
}

/// Flatten a vector onto the ground plane
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npc_id_ordering() {
        assert!(NpcId(1) < NpcId(2));
        assert_eq!(NpcId::new(4), NpcId(4));
    }

    #[test]
    fn test_yaw_round_trip() {
        let dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let back = forward_from_yaw(yaw_of(dir));
        assert!(back.abs_diff_eq(dir, 1e-5));
    }

    #[test]
    fn test_right_of_forward() {
        // Facing +Z, right is +X
        let right = right_of(Vec3::Z);
        assert!(right.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_same_point_tolerance() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert!(same_point(a, a + Vec3::splat(1e-7)));
        assert!(!same_point(a, a + Vec3::X * 0.01));
    }
}
