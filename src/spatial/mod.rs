pub mod occlusion;
pub mod sparse_hash;

pub use occlusion::{HitTag, Obstacle, RayHit, Raycaster, StaticScene};
pub use sparse_hash::SparseHashGrid;
