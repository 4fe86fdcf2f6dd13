//! Line-of-sight queries
//!
//! Visibility checks cast a single ray per target and trust whatever the
//! first hit is. [`StaticScene`] is a small box-and-cylinder world used by the
//! headless runner and tests; an engine host implements [`Raycaster`] over its
//! own physics scene instead.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::player::PlayerView;

/// What a ray hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitTag {
    Player,
    /// The shadow decoy; shares the player's collision tag
    Decoy,
    Obstacle,
    Npc,
}

impl HitTag {
    /// Hits that count as seeing the player (or their shadow)
    pub fn is_player(&self) -> bool {
        matches!(self, HitTag::Player | HitTag::Decoy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub tag: HitTag,
}

/// First-hit ray queries against the scene
pub trait Raycaster {
    /// First hit along an unbounded ray, if any
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<RayHit>;

    /// Called with the player snapshot before each tick. Hosts whose
    /// physics scene already tracks the player keep the default no-op.
    fn sync_player(&mut self, _player: &PlayerView) {}
}

impl<F> Raycaster for F
where
    F: Fn(Vec3, Vec3) -> Option<RayHit>,
{
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        self(origin, direction)
    }
}

/// Axis-aligned solid box (walls, houses, crates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
}

impl Obstacle {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Slab test; returns the entry distance along a normalized ray
    fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// Upright cylinder standing on `base`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Body {
    base: Vec3,
    radius: f32,
    height: f32,
    tag: HitTag,
}

impl Body {
    fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let ox = origin.x - self.base.x;
        let oz = origin.z - self.base.z;
        let a = dir.x * dir.x + dir.z * dir.z;
        if a < 1e-12 {
            return None;
        }

        let b = 2.0 * (ox * dir.x + oz * dir.z);
        let c = ox * ox + oz * oz - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt = disc.sqrt();
        let mut lo = (-b - sqrt) / (2.0 * a);
        let mut hi = (-b + sqrt) / (2.0 * a);

        // Clip against the cylinder's height range
        let bottom = self.base.y;
        let top = self.base.y + self.height;
        if dir.y.abs() < 1e-8 {
            if origin.y < bottom || origin.y > top {
                return None;
            }
        } else {
            let mut ty0 = (bottom - origin.y) / dir.y;
            let mut ty1 = (top - origin.y) / dir.y;
            if ty0 > ty1 {
                std::mem::swap(&mut ty0, &mut ty1);
            }
            lo = lo.max(ty0);
            hi = hi.min(ty1);
        }

        let entry = lo.max(0.0);
        if entry <= hi {
            Some(entry)
        } else {
            None
        }
    }
}

/// Static boxes plus the player's and decoy's bodies
#[derive(Debug, Clone)]
pub struct StaticScene {
    obstacles: Vec<Obstacle>,
    player: Option<Vec3>,
    decoy: Option<Vec3>,
    pub body_radius: f32,
    pub body_height: f32,
}

impl Default for StaticScene {
    fn default() -> Self {
        Self {
            obstacles: Vec::new(),
            player: None,
            decoy: None,
            body_radius: 0.5,
            body_height: 2.0,
        }
    }
}

impl StaticScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_obstacles(obstacles: Vec<Obstacle>) -> Self {
        Self {
            obstacles,
            ..Self::default()
        }
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        let radius = self.body_radius;
        let height = self.body_height;
        self.player
            .map(|base| (base, HitTag::Player))
            .into_iter()
            .chain(self.decoy.map(|base| (base, HitTag::Decoy)))
            .map(move |(base, tag)| Body {
                base,
                radius,
                height,
                tag,
            })
    }
}

impl Raycaster for StaticScene {
    /// Move the player and decoy bodies to match the snapshot
    ///
    /// A cloaked player still has a body; the oracle decides not to look.
    fn sync_player(&mut self, player: &PlayerView) {
        self.player = Some(player.position);
        self.decoy = player.decoy;
    }

    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        let dir = direction.try_normalize()?;

        let obstacle_hits = self
            .obstacles
            .iter()
            .filter_map(|o| o.intersect(origin, dir).map(|t| (t, HitTag::Obstacle)));
        let body_hits = self
            .bodies()
            .filter_map(|b| b.intersect(origin, dir).map(|t| (t, b.tag)));

        obstacle_hits
            .chain(body_hits)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, tag)| RayHit {
                point: origin + dir * t,
                distance: t,
                tag,
            })
    }
}
