//! Behavior state machine
//!
//! Alertness picks a band from the archetype's table ([`state`]); the band's
//! policy then issues speeds and destinations to the navigation service and
//! cues to the presentation layer.

pub mod attack;
pub mod guard;
pub mod intents;
pub mod slayer;
pub mod state;
pub mod steering;
pub mod victim;

pub use intents::{Intent, NpcIntent, Outbox};
pub use state::{state_for, BehaviorState, GuardBehavior, SlayerBehavior, VictimBehavior};

use glam::Vec3;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::{flatten, right_of};
use crate::navigation::NavigationService;
use crate::npc::Npc;
use crate::player::PlayerView;

/// Squared speed under which an agent counts as standing still
const MOVING_EPSILON: f32 = 1e-4;

/// Read-only inputs shared by every policy this tick
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub config: &'a SimulationConfig,
    pub player: &'a PlayerView,
    pub dt: f32,
}

/// Run the movement policy of the NPC's current band
pub fn run_policy<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
    out: &mut Outbox,
) {
    match npc.behavior_state {
        BehaviorState::Guard(band) => guard::run(npc, band, nav, ctx, rng, out),
        BehaviorState::Victim(band) => victim::run(npc, band, nav, ctx, rng, out),
        BehaviorState::Slayer(band) => slayer::run(npc, band, nav, ctx, rng, out),
    }
}

/// Cues tied to entering or leaving a band
pub fn on_transition(npc: &Npc, from: BehaviorState, to: BehaviorState, out: &mut Outbox) {
    tracing::debug!("{:?} ({:?}) {:?} -> {:?}", npc.id, npc.archetype, from, to);

    let wary = BehaviorState::Victim(VictimBehavior::Wary);
    if (from == wary) != (to == wary) {
        out.push(npc.id, Intent::Confused(to == wary));
    }
}

/// Moving flag on change, blend values while moving
pub fn report_locomotion(npc: &mut Npc, velocity: Vec3, out: &mut Outbox) {
    let flat = flatten(velocity);
    let moving = flat.length_squared() > MOVING_EPSILON;
    if moving != npc.moving {
        npc.moving = moving;
        out.push(npc.id, Intent::Moving(moving));
    }
    if !moving {
        return;
    }

    let scale = if npc.behavior_state.is_hurried() { 2.0 } else { 1.0 };
    let dir = flat.normalize_or_zero();
    out.push(
        npc.id,
        Intent::Locomotion {
            x: dir.dot(right_of(npc.forward)) * scale,
            y: dir.dot(flatten(npc.forward).normalize_or_zero()) * scale,
        },
    );
}
