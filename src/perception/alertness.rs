//! Alertness integrator
//!
//! Suspicion accumulates in a continuous counter in [-1, 1]. Crossing either
//! end steps the discrete alertness level (0-9) and throws the counter to the
//! opposite end, so a level change needs a full sweep of accumulated evidence
//! in the other direction before it can reverse.

use serde::{Deserialize, Serialize};

use crate::core::config::{ArchetypeProfile, SimulationConfig};

/// Highest alertness level
pub const MAX_ALERTNESS: u8 = 9;

/// What the oracle reported this tick, as far as suspicion cares
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Distance from the observer to the detected point
    pub distance: f32,
    /// Player stood in light
    pub in_light: bool,
    pub sprinting: bool,
}

/// Rates and weights for one NPC's integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertnessParams {
    pub increase_rate: f32,
    pub decrease_rate: f32,
    pub observer_max_range: f32,
    pub proximity_weight: f32,
    pub unlit_walk_scale: f32,
    pub base_passive_vision_range: f32,
}

impl AlertnessParams {
    pub fn from_config(config: &SimulationConfig, profile: &ArchetypeProfile) -> Self {
        Self {
            increase_rate: profile.alertness_increase,
            decrease_rate: profile.alertness_decrease,
            observer_max_range: config.observer_max_range,
            proximity_weight: config.proximity_weight,
            unlit_walk_scale: config.unlit_walk_scale,
            base_passive_vision_range: profile.base_passive_vision_range,
        }
    }

    /// Extra rate for close detections; negative beyond the observer's range
    pub fn proximity_bonus(&self, distance: f32) -> f32 {
        (1.0 - distance / self.observer_max_range) * self.proximity_weight
    }
}

/// Direction of the last level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStep {
    Raised,
    Lowered,
    Steady,
}

/// Discrete alertness plus its hysteresis counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertnessTracker {
    alertness: u8,
    alert_counter: f32,
    /// Decay floor once the level has reached it
    min_calm_down: u8,
    /// Current near-field detection radius
    passive_vision_range: f32,
}

impl AlertnessTracker {
    pub fn new(min_calm_down: u8, base_passive_vision_range: f32) -> Self {
        Self {
            alertness: 0,
            alert_counter: 0.0,
            min_calm_down: min_calm_down.min(MAX_ALERTNESS),
            passive_vision_range: base_passive_vision_range,
        }
    }

    pub fn alertness(&self) -> u8 {
        self.alertness
    }

    pub fn alert_counter(&self) -> f32 {
        self.alert_counter
    }

    pub fn min_calm_down(&self) -> u8 {
        self.min_calm_down
    }

    pub fn passive_vision_range(&self) -> f32 {
        self.passive_vision_range
    }

    /// Force a level (interactions, hiding); the counter is kept
    pub fn set_alertness(&mut self, level: u8) {
        self.alertness = level.min(MAX_ALERTNESS);
    }

    /// Restore a saved level and counter
    pub fn restore(&mut self, alertness: u8, alert_counter: f32) {
        self.alertness = alertness.min(MAX_ALERTNESS);
        self.alert_counter = alert_counter.clamp(-1.0, 1.0);
    }

    /// Restore a saved near-field radius
    pub fn set_passive_vision_range(&mut self, range: f32) {
        self.passive_vision_range = range.max(0.0);
    }

    /// Push the counter without stepping the level
    ///
    /// A boost that saturates the counter only becomes a level change on the
    /// next [`update`](Self::update).
    pub fn boost(&mut self, amount: f32) {
        self.alert_counter = (self.alert_counter + amount).clamp(-1.0, 1.0);
    }

    /// Integrate one tick and apply hysteresis
    pub fn update(&mut self, sighting: Option<Sighting>, params: &AlertnessParams, dt: f32) -> u8 {
        match sighting {
            Some(seen) => {
                let scale = if seen.in_light {
                    1.0
                } else if seen.sprinting {
                    self.passive_vision_range = params.base_passive_vision_range * 2.0;
                    1.0
                } else {
                    self.passive_vision_range = params.base_passive_vision_range;
                    params.unlit_walk_scale
                };

                let bonus = params.proximity_bonus(seen.distance);
                self.alert_counter += dt * (params.increase_rate + bonus) * scale;
            }
            None => {
                self.alert_counter -= dt * params.decrease_rate;
            }
        }
        self.alert_counter = self.alert_counter.clamp(-1.0, 1.0);

        match self.apply_hysteresis() {
            AlertStep::Raised => tracing::debug!("Alertness raised to {}", self.alertness),
            AlertStep::Lowered => tracing::debug!("Alertness lowered to {}", self.alertness),
            AlertStep::Steady => {}
        }

        self.alertness
    }

    fn apply_hysteresis(&mut self) -> AlertStep {
        if self.alert_counter <= -1.0 {
            let floor = if self.alertness >= self.min_calm_down {
                self.min_calm_down
            } else {
                0
            };
            let previous = self.alertness;
            self.alertness = self.alertness.saturating_sub(1).max(floor);
            self.alert_counter = 1.0;
            if self.alertness < previous {
                AlertStep::Lowered
            } else {
                AlertStep::Steady
            }
        } else if self.alert_counter >= 1.0 {
            let previous = self.alertness;
            self.alertness = (self.alertness + 1).min(MAX_ALERTNESS);
            self.alert_counter = -1.0;
            if self.alertness > previous {
                AlertStep::Raised
            } else {
                AlertStep::Steady
            }
        } else {
            AlertStep::Steady
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> AlertnessParams {
        AlertnessParams::from_config(&SimulationConfig::default(), &ArchetypeProfile::default())
    }

    fn lit_at(distance: f32) -> Option<Sighting> {
        Some(Sighting {
            distance,
            in_light: true,
            sprinting: false,
        })
    }

    #[test]
    fn test_proximity_bonus_goes_negative_beyond_range() {
        let p = params();
        assert!((p.proximity_bonus(0.0) - 5.0).abs() < 1e-6);
        assert!(p.proximity_bonus(30.0).abs() < 1e-6);
        assert!(p.proximity_bonus(60.0) < 0.0);
    }

    #[test]
    fn test_close_lit_sighting_steps_up_and_recoils() {
        let mut tracker = AlertnessTracker::new(5, 3.0);
        // dt * (2.5 + 5) = 0.75 per tick at distance 0
        tracker.update(lit_at(0.0), &params(), 0.1);
        assert_eq!(tracker.alertness(), 0);
        assert!((tracker.alert_counter() - 0.75).abs() < 1e-5);

        tracker.update(lit_at(0.0), &params(), 0.1);
        assert_eq!(tracker.alertness(), 1);
        assert_eq!(tracker.alert_counter(), -1.0);
    }

    #[test]
    fn test_unlit_walk_halves_rate() {
        let mut tracker = AlertnessTracker::new(5, 3.0);
        let seen = Some(Sighting {
            distance: 0.0,
            in_light: false,
            sprinting: false,
        });
        tracker.update(seen, &params(), 0.1);
        assert!((tracker.alert_counter() - 0.375).abs() < 1e-5);
    }

    #[test]
    fn test_sprinting_doubles_vision_range_and_walking_resets_it() {
        let mut tracker = AlertnessTracker::new(5, 3.0);
        let sprint = Some(Sighting {
            distance: 10.0,
            in_light: false,
            sprinting: true,
        });
        tracker.update(sprint, &params(), 0.01);
        assert_eq!(tracker.passive_vision_range(), 6.0);

        // Lit detections leave the range alone
        tracker.update(lit_at(10.0), &params(), 0.01);
        assert_eq!(tracker.passive_vision_range(), 6.0);

        let walk = Some(Sighting {
            distance: 10.0,
            in_light: false,
            sprinting: false,
        });
        tracker.update(walk, &params(), 0.01);
        assert_eq!(tracker.passive_vision_range(), 3.0);

        // Losing the player does not touch it either
        tracker.update(sprint, &params(), 0.01);
        tracker.update(None, &params(), 0.01);
        assert_eq!(tracker.passive_vision_range(), 6.0);
    }

    #[test]
    fn test_decay_respects_min_calm_down() {
        let mut tracker = AlertnessTracker::new(5, 3.0);
        tracker.set_alertness(6);
        tracker.restore(6, -0.95);

        // 0.3 per second; one second is enough to cross -1
        tracker.update(None, &params(), 1.0);
        assert_eq!(tracker.alertness(), 5);
        assert_eq!(tracker.alert_counter(), 1.0);

        // Sweep back down repeatedly; never drops below the floor
        for _ in 0..50 {
            tracker.update(None, &params(), 1.0);
        }
        assert_eq!(tracker.alertness(), 5);
    }

    #[test]
    fn test_decay_below_floor_reaches_zero() {
        let mut tracker = AlertnessTracker::new(5, 3.0);
        tracker.restore(3, 0.0);
        for _ in 0..100 {
            tracker.update(None, &params(), 1.0);
        }
        assert_eq!(tracker.alertness(), 0);
    }

    #[test]
    fn test_boost_clamps_without_stepping() {
        let mut tracker = AlertnessTracker::new(5, 3.0);
        tracker.boost(3.0);
        assert_eq!(tracker.alert_counter(), 1.0);
        assert_eq!(tracker.alertness(), 0);

        // The next update with nothing seen still crosses +1 first
        tracker.update(None, &params(), 0.0);
        assert_eq!(tracker.alertness(), 1);
    }

    #[test]
    fn test_caps_at_nine() {
        let mut tracker = AlertnessTracker::new(5, 3.0);
        tracker.restore(9, 0.9);
        tracker.update(lit_at(0.0), &params(), 1.0);
        assert_eq!(tracker.alertness(), MAX_ALERTNESS);
        assert_eq!(tracker.alert_counter(), -1.0);
    }

    fn arb_sighting() -> impl Strategy<Value = Option<Sighting>> {
        prop::option::of((0.0f32..100.0, any::<bool>(), any::<bool>()).prop_map(
            |(distance, in_light, sprinting)| Sighting {
                distance,
                in_light,
                sprinting,
            },
        ))
    }

    proptest! {
        #[test]
        fn prop_counter_and_level_stay_bounded(
            min_calm_down in 0u8..=9,
            steps in prop::collection::vec((arb_sighting(), 0.0f32..2.0), 1..200),
        ) {
            let mut tracker = AlertnessTracker::new(min_calm_down, 3.0);
            let p = params();
            let mut reached_floor = false;

            for (sighting, dt) in steps {
                tracker.update(sighting, &p, dt);
                prop_assert!(tracker.alert_counter() >= -1.0 && tracker.alert_counter() <= 1.0);
                prop_assert!(tracker.alertness() <= MAX_ALERTNESS);

                if tracker.alertness() >= min_calm_down {
                    reached_floor = true;
                }
                if reached_floor {
                    prop_assert!(tracker.alertness() >= min_calm_down);
                }
            }
        }
    }
}
