//! Slayer policy
//!
//! The slayer never raises an alarm. At rest it circles the town on a ring
//! of waypoints, each nudged a random distance toward the player.

use rand_chacha::ChaCha8Rng;

use crate::behavior::attack::{investigate, pursue};
use crate::behavior::intents::Outbox;
use crate::behavior::state::SlayerBehavior;
use crate::behavior::steering::ring_waypoint;
use crate::behavior::PolicyContext;
use crate::navigation::{request_destination, NavigationService};
use crate::npc::{ArchetypeMemory, Npc};

pub fn run<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    band: SlayerBehavior,
    nav: &mut N,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
    out: &mut Outbox,
) {
    match band {
        SlayerBehavior::Wander => circle_town(npc, nav, ctx, rng),
        SlayerBehavior::Investigate => investigate(npc, nav, ctx, out),
        SlayerBehavior::Search => pursue(npc, nav, ctx, rng, out),
    }
}

fn circle_town<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
) {
    let id = npc.id;
    nav.set_speed(id, npc.profile.normal_speed);

    let ArchetypeMemory::Slayer(memory) = &mut npc.memory else {
        return;
    };
    if nav.remaining_distance(id) > ctx.config.slayer_segment_arrival {
        return;
    }

    let segments = ctx.config.slayer_ring_segments.max(1);
    let target = ring_waypoint(
        memory.segment,
        segments,
        ctx.config.slayer_ring_radius,
        ctx.player.position,
        ctx.config.slayer_player_bias,
        rng,
    );
    memory.segment = (memory.segment + 1) % segments;
    request_destination(nav, id, target);
}
