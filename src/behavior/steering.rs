//! Steering helpers shared by the policies
//!
//! Pure functions over poses. Randomness comes from the caller's rng so a
//! seeded session replays exactly.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::core::config::WanderParams;
use crate::core::types::{flatten, forward_from_yaw, yaw_of};

/// Next wander destination for a victim
///
/// A random point on a circle, jittered and pushed back onto the circle,
/// projected ahead of the NPC and pulled toward home by `home_push`.
pub fn wander_target(
    position: Vec3,
    forward: Vec3,
    home: Vec3,
    params: &WanderParams,
    rng: &mut impl Rng,
) -> Vec3 {
    let angle = rng.gen::<f32>() * TAU;
    let mut circle = Vec3::new(angle.cos(), 0.0, angle.sin()) * params.radius;

    let jitter = Vec3::new(rng.gen_range(-1.0..=1.0), 0.0, rng.gen_range(-1.0..=1.0));
    circle += jitter * params.jitter;
    circle = circle.normalize_or_zero() * params.radius;

    let offset = flatten(circle + forward * params.forward_distance);
    let to_home = flatten(home - position).normalize_or_zero();

    position + offset + to_home * params.home_push
}

/// Point `radius` away from `center` in a random ground direction
///
/// Offsets are drawn on an integer lattice; a zero draw leaves the target on
/// the centre itself.
pub fn random_search_point(center: Vec3, radius: f32, rng: &mut impl Rng) -> Vec3 {
    let x = rng.gen_range(-10..10) as f32;
    let z = rng.gen_range(-10..10) as f32;
    center + Vec3::new(x, 0.0, z).normalize_or_zero() * radius
}

/// Waypoint `segment` of a ring around the origin, pulled toward the player
pub fn ring_waypoint(
    segment: u32,
    segments: u32,
    radius: f32,
    player: Vec3,
    max_bias: f32,
    rng: &mut impl Rng,
) -> Vec3 {
    let angle = segment as f32 * TAU / segments.max(1) as f32;
    let on_ring = Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
    let pull = flatten(player - on_ring).normalize_or_zero() * rng.gen::<f32>() * max_bias;

    flatten(on_ring + pull)
}

/// Shortest signed angle from `from` to `to` (radians)
fn angle_delta(from: f32, to: f32) -> f32 {
    let mut delta = (to - from) % TAU;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    delta
}

/// Turn a facing part of the way toward `direction`
///
/// `t` is the interpolation factor for this tick, clamped to [0, 1].
pub fn turn_towards(forward: Vec3, direction: Vec3, t: f32) -> Vec3 {
    let flat = flatten(direction);
    if flat.length_squared() < 1e-8 {
        return forward;
    }
    let from = yaw_of(forward);
    let to = yaw_of(flat);
    forward_from_yaw(from + angle_delta(from, to) * t.clamp(0.0, 1.0))
}

/// Spin on the spot (scanning a reached disturbance)
pub fn rotate_in_place(forward: Vec3, degrees_per_second: f32, dt: f32) -> Vec3 {
    forward_from_yaw(yaw_of(forward) + (degrees_per_second * dt).to_radians())
}
