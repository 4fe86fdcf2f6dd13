//! Investigate, pursue and strike
//!
//! Shared by guards and the slayer. Investigation creeps toward the
//! disturbance; pursuit runs at it while the target is in sight and sweeps
//! random points around it once the trail goes cold. A strike lands on
//! whichever body was detected: the decoy is destroyed, the player is hurt.

use glam::Vec3;
use rand_chacha::ChaCha8Rng;

use crate::behavior::intents::{Intent, Outbox};
use crate::behavior::steering::{random_search_point, rotate_in_place, turn_towards};
use crate::behavior::PolicyContext;
use crate::navigation::{halt, request_destination, NavigationService};
use crate::npc::Npc;
use crate::perception::visibility::TargetKind;
use crate::player::PlayerEffect;

/// Slow approach to the disturbance, scanning once there
pub fn investigate<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    ctx: &PolicyContext,
    out: &mut Outbox,
) {
    let id = npc.id;
    nav.set_speed(id, npc.profile.slow_speed);
    let target = npc.disturbance.get(npc.position, ctx.player.position);

    if npc.player_visible {
        if !npc.was_visible {
            out.push(id, Intent::AlertCue);
        }
        request_destination(nav, id, target);
    } else if npc.position.distance(target) > ctx.config.arrival_distance {
        request_destination(nav, id, target);
    } else {
        npc.forward = rotate_in_place(npc.forward, ctx.config.search_turn_rate_degrees, ctx.dt);
    }
}

/// Fast chase of the disturbance; strike in reach, search when lost
pub fn pursue<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
    out: &mut Outbox,
) {
    let id = npc.id;
    nav.set_speed(id, npc.profile.fast_speed);
    tick_cooldown(npc, ctx.dt);

    let target = npc.disturbance.get(npc.position, ctx.player.position);

    if npc.player_visible {
        if npc.position.distance(target) > ctx.config.attack_reach {
            request_destination(nav, id, target);
        } else {
            strike(npc, nav, target, ctx, out);
        }
    } else if nav.remaining_distance(id) <= ctx.config.arrival_distance {
        let point = random_search_point(target, npc.profile.search_radius, rng);
        tracing::trace!("{:?} searching around {:?}", id, point);
        request_destination(nav, id, point);
    }
}

/// Attack cooldown runs down only while pursuing; floors at zero
fn tick_cooldown(npc: &mut Npc, dt: f32) {
    if let Some(cooldown) = npc.memory.attack_cooldown_mut() {
        *cooldown = (*cooldown - dt).max(0.0);
    }
}

/// Face the target, stop, and hit the detected body when the cooldown allows
fn strike<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    target: Vec3,
    ctx: &PolicyContext,
    out: &mut Outbox,
) {
    let id = npc.id;
    npc.forward = turn_towards(npc.forward, target - npc.position, npc.profile.fast_speed * ctx.dt);
    halt(nav, id);

    let position = npc.position;
    let detected = npc.detected;
    let attack_speed = npc.profile.attack_speed;
    let damage = npc.profile.attack_damage;
    let Some(cooldown) = npc.memory.attack_cooldown_mut() else {
        return;
    };
    if *cooldown > 0.0 {
        return;
    }

    let effect = match (detected, ctx.player.decoy) {
        (Some(TargetKind::Decoy), Some(decoy))
            if position.distance(decoy) <= ctx.config.attack_reach =>
        {
            tracing::debug!("{:?} destroyed the decoy", id);
            PlayerEffect::DestroyDecoy
        }
        (Some(TargetKind::Player), _) => {
            tracing::debug!("{:?} hit the player for {}", id, damage);
            PlayerEffect::Damage(damage)
        }
        _ => return,
    };

    out.push(id, Intent::AttackCue);
    out.effect(effect);
    *cooldown = attack_speed;
}
