//! Mesh buffers, template primitives, deformers and hardpoint location

mod hardpoints;
mod modifiers;
mod primitives;
mod types;

pub use types::{Aabb, MAX_VERTICES, MeshBuffer, MeshBuilder, MeshBuilderUV};

pub use hardpoints::{Direction, HardpointPolicy, HardpointSet, locate, locate_with};

pub use modifiers::{MAX_TAPER, MeshApply, MeshModifier, Resize, Taper};

pub use primitives::{MAX_RING_SEGMENTS, generate_diamond, generate_ring_hull};
