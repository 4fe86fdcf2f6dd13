//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Values can be overridden from a
//! TOML file; any field left out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{NocturneError, Result};
use crate::npc::archetype::Archetype;

/// Parameters of the wander steering behaviour used by victims
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderParams {
    /// Radius of the circle the random target is picked on
    pub radius: f32,
    /// Magnitude of the random jitter added before re-normalizing
    pub jitter: f32,
    /// How far ahead of the NPC the circle is projected
    pub forward_distance: f32,
    /// Pull toward home added to every wander target (0 = no pull)
    pub home_push: f32,
}

impl Default for WanderParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            jitter: 1.0,
            forward_distance: 1.0,
            home_push: 0.0,
        }
    }
}

/// Per-archetype defaults applied when an NPC is initialized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeProfile {
    /// Starting (and maximum) health
    pub max_health: i32,
    /// Alertness floor once the NPC has been raised above it
    ///
    /// Victims reset to this level when they enter or leave home, so it
    /// should map to a band that does not flee.
    pub min_calm_down: u8,
    /// Radius within which an alerting NPC raises its neighbours
    pub alert_range: f32,
    /// Rate `alert_counter` rises while the player is detected (per second)
    pub alertness_increase: f32,
    /// Rate `alert_counter` falls while nothing is detected (per second)
    pub alertness_decrease: f32,
    /// Passive near-field detection radius while the player walks
    pub base_passive_vision_range: f32,
    /// Relaxed movement speed
    pub normal_speed: f32,
    /// Hurried movement speed (attack, search, alert)
    pub fast_speed: f32,
    /// Cautious movement speed (investigate, wander)
    pub slow_speed: f32,
    /// Seconds between attacks
    pub attack_speed: f32,
    /// Damage dealt per attack
    pub attack_damage: i32,
    /// Displacement of a search retarget from the disturbance
    pub search_radius: f32,
    /// Seconds a victim stays hidden at home
    pub time_hiding: f32,
    /// Wander steering parameters
    pub wander: WanderParams,
}

impl Default for ArchetypeProfile {
    fn default() -> Self {
        Self {
            max_health: 1,
            min_calm_down: 5,
            alert_range: 25.0,
            alertness_increase: 2.5,
            alertness_decrease: 0.3,
            base_passive_vision_range: 3.0,
            normal_speed: 1.0,
            fast_speed: 2.0,
            slow_speed: 0.5,
            attack_speed: 3.0,
            attack_damage: 1,
            search_radius: 5.0,
            time_hiding: 5.0,
            wander: WanderParams::default(),
        }
    }
}

/// Profiles for each archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeProfiles {
    pub guard: ArchetypeProfile,
    pub noble: ArchetypeProfile,
    pub drunkard: ArchetypeProfile,
    pub slayer: ArchetypeProfile,
}

impl Default for ArchetypeProfiles {
    fn default() -> Self {
        Self {
            guard: ArchetypeProfile {
                max_health: 2,
                ..ArchetypeProfile::default()
            },
            noble: ArchetypeProfile {
                // Wary band, so a noble leaving home does not bolt straight back
                min_calm_down: 2,
                wander: WanderParams {
                    home_push: 1.0,
                    ..WanderParams::default()
                },
                ..ArchetypeProfile::default()
            },
            drunkard: ArchetypeProfile::default(),
            slayer: ArchetypeProfile {
                max_health: 3,
                search_radius: 10.0,
                ..ArchetypeProfile::default()
            },
        }
    }
}

impl ArchetypeProfiles {
    pub fn get(&self, archetype: Archetype) -> &ArchetypeProfile {
        match archetype {
            Archetype::Guard => &self.guard,
            Archetype::Noble => &self.noble,
            Archetype::Drunkard => &self.drunkard,
            Archetype::Slayer => &self.slayer,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Archetype, &ArchetypeProfile)> {
        Archetype::all().iter().map(move |&a| (a, self.get(a)))
    }
}

/// Configuration for the simulation systems
///
/// These values match the tuning of the shipped town. Changing them will
/// affect how forgiving the stealth feels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === PERCEPTION ===
    /// Height of the ray origin above the observer's feet
    pub eye_height: f32,

    /// Vertical field of view of an observer's view frustum (degrees)
    pub field_of_view_degrees: f32,

    /// Width / height of the observer's viewport
    pub aspect_ratio: f32,

    /// Far range of an observer, used to scale the proximity bonus
    ///
    /// Detections further away than this produce a negative bonus.
    pub observer_max_range: f32,

    /// Weight of the proximity bonus added to the alert rate
    pub proximity_weight: f32,

    /// Scale of the alert rate when the player walks unlit
    pub unlit_walk_scale: f32,

    /// Any NPC this close to a cloaked player breaks the cloak
    pub cloak_reveal_radius: f32,

    // === MOVEMENT ===
    /// Remaining path distance that counts as "arrived" for retargeting
    pub arrival_distance: f32,

    /// Distance at which an attacker stops chasing and strikes
    pub attack_reach: f32,

    /// Turn rate while scanning around a reached disturbance (degrees/s)
    pub search_turn_rate_degrees: f32,

    // === VICTIM HOMES ===
    /// Remaining path distance required to count as home
    pub home_remaining_distance: f32,

    /// Straight-line distance to home required to count as home
    ///
    /// Both conditions must hold so a path that ends behind a wall near
    /// the door does not count.
    pub home_radius: f32,

    // === SLAYER PATROL ===
    /// Radius of the ring the slayer walks around the town centre
    pub slayer_ring_radius: f32,

    /// Number of waypoints on the slayer's ring
    pub slayer_ring_segments: u32,

    /// Maximum pull toward the player added to each ring waypoint
    pub slayer_player_bias: f32,

    /// Remaining distance at which the slayer advances to the next segment
    pub slayer_segment_arrival: f32,

    // === SPATIAL ===
    /// Size of each cell in the propagation hash grid (world units)
    ///
    /// Queries scan as many cells as needed to cover the alert range, so
    /// this only affects performance.
    pub grid_cell_size: f32,

    // === NIGHT ===
    /// Length of a night in seconds
    pub night_length: f32,

    /// Consumed villagers per upgrade point
    pub consumptions_per_upgrade: u32,

    /// Archetype defaults
    pub profiles: ArchetypeProfiles,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            eye_height: 1.0,
            field_of_view_degrees: 60.0,
            aspect_ratio: 16.0 / 9.0,
            observer_max_range: 30.0,
            proximity_weight: 5.0,
            unlit_walk_scale: 0.5,
            cloak_reveal_radius: 1.5,

            arrival_distance: 1.0,
            attack_reach: 1.5,
            search_turn_rate_degrees: 10.0,

            home_remaining_distance: 1.0,
            home_radius: 5.0,

            slayer_ring_radius: 15.0,
            slayer_ring_segments: 8,
            slayer_player_bias: 10.0,
            slayer_segment_arrival: 1.5,

            grid_cell_size: 25.0,

            night_length: 300.0,
            consumptions_per_upgrade: 5,

            profiles: ArchetypeProfiles::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, filling unspecified fields with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.observer_max_range <= 0.0 {
            return Err(NocturneError::InvalidConfig(format!(
                "observer_max_range ({}) must be positive",
                self.observer_max_range
            )));
        }

        if self.field_of_view_degrees <= 0.0 || self.field_of_view_degrees >= 180.0 {
            return Err(NocturneError::InvalidConfig(format!(
                "field_of_view_degrees ({}) must be in (0, 180)",
                self.field_of_view_degrees
            )));
        }

        if self.aspect_ratio <= 0.0 || self.grid_cell_size <= 0.0 {
            return Err(NocturneError::InvalidConfig(
                "aspect_ratio and grid_cell_size must be positive".into(),
            ));
        }

        if self.slayer_ring_segments == 0 || self.consumptions_per_upgrade == 0 {
            return Err(NocturneError::InvalidConfig(
                "slayer_ring_segments and consumptions_per_upgrade must be non-zero".into(),
            ));
        }

        for (archetype, profile) in self.profiles.iter() {
            if profile.min_calm_down > 9 {
                return Err(NocturneError::InvalidConfig(format!(
                    "{:?}: min_calm_down ({}) must be within 0-9",
                    archetype, profile.min_calm_down
                )));
            }

            if profile.alertness_increase <= 0.0 || profile.alertness_decrease <= 0.0 {
                return Err(NocturneError::InvalidConfig(format!(
                    "{:?}: alertness rates must be positive",
                    archetype
                )));
            }

            if profile.slow_speed < 0.0
                || profile.slow_speed > profile.normal_speed
                || profile.normal_speed > profile.fast_speed
            {
                return Err(NocturneError::InvalidConfig(format!(
                    "{:?}: speeds must satisfy 0 <= slow <= normal <= fast",
                    archetype
                )));
            }

            if !profile.alert_range.is_finite() || profile.alert_range < 0.0 {
                return Err(NocturneError::InvalidConfig(format!(
                    "{:?}: alert_range ({}) must be finite and non-negative",
                    archetype, profile.alert_range
                )));
            }

            if !profile.base_passive_vision_range.is_finite()
                || profile.base_passive_vision_range < 0.0
            {
                return Err(NocturneError::InvalidConfig(format!(
                    "{:?}: base_passive_vision_range must be finite and non-negative",
                    archetype
                )));
            }

            if profile.max_health <= 0 {
                return Err(NocturneError::InvalidConfig(format!(
                    "{:?}: max_health must be positive",
                    archetype
                )));
            }
        }

        Ok(())
    }
}
