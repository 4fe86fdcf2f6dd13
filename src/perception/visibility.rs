//! Visibility oracle - can this NPC perceive the player right now?
//!
//! Two tests per candidate point:
//! - a cheap near-field disc just ahead of the observer (point-blank sneaking)
//! - view frustum containment followed by a single occlusion ray
//!
//! The decoy is always checked first. The player's own body is only checked
//! while uncloaked.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{flatten, right_of, UP};
use crate::player::PlayerView;
use crate::spatial::occlusion::Raycaster;

/// Camera-like view volume attached to an observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewFrustum {
    /// Vertical field of view in radians
    pub vertical_fov: f32,
    /// Width / height
    pub aspect: f32,
}

impl ViewFrustum {
    pub fn new(vertical_fov_degrees: f32, aspect: f32) -> Self {
        Self {
            vertical_fov: vertical_fov_degrees.to_radians(),
            aspect,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.field_of_view_degrees, config.aspect_ratio)
    }

    /// Normalized viewport coordinates of `point` for an eye facing `forward`
    ///
    /// x and y are in [0, 1] inside the view, z is the depth along the view
    /// direction. Returns `None` for points on the eye plane.
    pub fn viewport_point(&self, eye: Vec3, forward: Vec3, point: Vec3) -> Option<Vec3> {
        let fwd = flatten(forward).try_normalize().unwrap_or(Vec3::Z);
        let right = right_of(fwd);
        let offset = point - eye;

        let depth = offset.dot(fwd);
        if depth.abs() <= f32::EPSILON {
            return None;
        }

        let tan_v = (self.vertical_fov * 0.5).tan();
        let tan_h = tan_v * self.aspect;
        let ndc_x = offset.dot(right) / (depth * tan_h);
        let ndc_y = offset.dot(UP) / (depth * tan_v);

        Some(Vec3::new(ndc_x * 0.5 + 0.5, ndc_y * 0.5 + 0.5, depth))
    }

    /// Whether `point` is inside the view volume (in front of the eye)
    pub fn contains(&self, eye: Vec3, forward: Vec3, point: Vec3) -> bool {
        match self.viewport_point(eye, forward, point) {
            Some(v) => {
                (0.0..=1.0).contains(&v.x) && (0.0..=1.0).contains(&v.y) && v.z >= 0.0
            }
            None => false,
        }
    }
}

/// Everything the oracle needs to know about the looking NPC
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub position: Vec3,
    pub forward: Vec3,
    /// Radius of the near-field detection disc
    pub passive_vision_range: f32,
    pub frustum: ViewFrustum,
    pub eye_height: f32,
}

impl Observer {
    /// Centre of the near-field disc, half a radius ahead of the observer
    pub fn near_field_origin(&self) -> Vec3 {
        self.position + self.forward * self.passive_vision_range * 0.5
    }

    pub fn eye(&self) -> Vec3 {
        self.position + UP * self.eye_height
    }
}

/// Which body was seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Decoy,
    Player,
}

/// A successful visibility check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub point: Vec3,
    pub target: TargetKind,
}

/// Check a single candidate point
pub fn can_see_point(observer: &Observer, point: Vec3, raycaster: &dyn Raycaster) -> bool {
    if observer.near_field_origin().distance(point) <= observer.passive_vision_range {
        return true;
    }

    if !observer.frustum.contains(observer.eye(), observer.forward, point) {
        return false;
    }

    // Ray leaves from eye height but runs parallel to the feet-to-target line
    raycaster
        .raycast(observer.eye(), point - observer.position)
        .map(|hit| hit.tag.is_player())
        .unwrap_or(false)
}

/// Find the point the observer currently perceives, decoy first
pub fn is_target_visible(
    observer: &Observer,
    player: &PlayerView,
    raycaster: &dyn Raycaster,
) -> Option<Detection> {
    if let Some(decoy) = player.decoy {
        if can_see_point(observer, decoy, raycaster) {
            return Some(Detection {
                point: decoy,
                target: TargetKind::Decoy,
            });
        }
    }

    if !player.cloaked && can_see_point(observer, player.position, raycaster) {
        return Some(Detection {
            point: player.position,
            target: TargetKind::Player,
        });
    }

    None
}
