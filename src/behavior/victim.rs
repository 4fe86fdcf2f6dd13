//! Noble and drunkard policy
//!
//! Victims wander until something spooks them, stop to stare, then run for
//! home and hide there for a while. A hidden victim is out of the world: no
//! presence, no navigation, no perception.

use glam::Vec3;
use rand_chacha::ChaCha8Rng;

use crate::behavior::intents::{Intent, Outbox};
use crate::behavior::state::VictimBehavior;
use crate::behavior::steering::{turn_towards, wander_target};
use crate::behavior::PolicyContext;
use crate::core::config::SimulationConfig;
use crate::core::types::NpcId;
use crate::navigation::{request_destination, NavigationService};
use crate::npc::{ArchetypeMemory, Npc};

pub fn run<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    band: VictimBehavior,
    nav: &mut N,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
    out: &mut Outbox,
) {
    match band {
        VictimBehavior::Wander => wander(npc, nav, ctx, rng),
        VictimBehavior::Wary => stare(npc, nav, ctx),
        VictimBehavior::Flee => head_home(npc, nav, ctx, out, false),
        VictimBehavior::Alert => head_home(npc, nav, ctx, out, true),
    }
}

fn wander<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
) {
    let id = npc.id;
    nav.set_speed(id, npc.profile.slow_speed);
    npc.fleeing = false;

    if nav.remaining_distance(id) <= ctx.config.arrival_distance {
        let home = npc.home().unwrap_or(npc.position);
        let target = wander_target(npc.position, npc.forward, home, &npc.profile.wander, rng);
        request_destination(nav, id, target);
    }
}

/// Stand still and turn toward whatever caught the eye
fn stare<N: NavigationService + ?Sized>(npc: &mut Npc, nav: &mut N, ctx: &PolicyContext) {
    nav.set_speed(npc.id, 0.0);
    npc.fleeing = false;

    let target = npc.disturbance.get(npc.position, ctx.player.position);
    npc.forward = turn_towards(
        npc.forward,
        target - npc.position,
        npc.profile.normal_speed * ctx.dt,
    );
}

/// Run home; the alert cue only sounds when fleeing at normal speed
fn head_home<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    ctx: &PolicyContext,
    out: &mut Outbox,
    hurried: bool,
) {
    let id = npc.id;
    let speed = if hurried {
        npc.profile.fast_speed
    } else {
        npc.profile.normal_speed
    };
    nav.set_speed(id, speed);

    let ArchetypeMemory::Victim(memory) = &npc.memory else {
        return;
    };
    let home = memory.home;
    let can_hide = memory.can_hide;

    if !npc.fleeing {
        if !hurried {
            out.push(id, Intent::AlertCue);
        }
        npc.fleeing = true;
    }
    request_destination(nav, id, home);

    if can_hide && arrived_home(nav, id, npc.position, home, ctx.config) {
        enter_home(npc, nav, out);
    }
}

/// All of: finite remaining distance within reach, a complete path, and
/// home itself close by
pub fn arrived_home<N: NavigationService + ?Sized>(
    nav: &N,
    npc: NpcId,
    position: Vec3,
    home: Vec3,
    config: &SimulationConfig,
) -> bool {
    let remaining = nav.remaining_distance(npc);
    remaining.is_finite()
        && nav.path_complete(npc)
        && remaining <= config.home_remaining_distance
        && position.distance(home) <= config.home_radius
}

pub fn enter_home<N: NavigationService + ?Sized>(npc: &mut Npc, nav: &mut N, out: &mut Outbox) {
    nav.set_enabled(npc.id, false);
    out.push(npc.id, Intent::Hide);

    npc.set_alertness(npc.alert.min_calm_down());
    npc.in_home = true;
    if let ArchetypeMemory::Victim(memory) = &mut npc.memory {
        memory.hide_timer = npc.profile.time_hiding;
    }
    tracing::info!("{:?} ({:?}) hid at home", npc.id, npc.archetype);
}

pub fn exit_home<N: NavigationService + ?Sized>(npc: &mut Npc, nav: &mut N, out: &mut Outbox) {
    nav.set_enabled(npc.id, true);
    out.push(npc.id, Intent::Reveal);

    npc.set_alertness(npc.alert.min_calm_down());
    npc.in_home = false;
    tracing::info!("{:?} ({:?}) left home", npc.id, npc.archetype);
}

/// Count down the hide timer; returns true while still hidden
pub fn tick_hiding<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    dt: f32,
    out: &mut Outbox,
) -> bool {
    let ArchetypeMemory::Victim(memory) = &mut npc.memory else {
        return false;
    };
    memory.hide_timer -= dt;
    if memory.hide_timer > 0.0 {
        return true;
    }
    exit_home(npc, nav, out);
    false
}
