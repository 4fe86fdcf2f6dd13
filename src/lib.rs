//! Nocturne - NPC perception and behavior core for a night-time stealth game

pub mod behavior;
pub mod core;
pub mod navigation;
pub mod npc;
pub mod perception;
pub mod player;
pub mod session;
pub mod spatial;
