//! Perception: what an NPC sees, how suspicious it gets, and who it tells

pub mod alertness;
pub mod propagation;
pub mod visibility;

pub use alertness::{AlertStep, AlertnessParams, AlertnessTracker, Sighting, MAX_ALERTNESS};
pub use propagation::{AlertBoost, AlertPropagation};
pub use visibility::{is_target_visible, Detection, Observer, TargetKind, ViewFrustum};
