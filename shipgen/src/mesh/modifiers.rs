//! Mesh deformers
//!
//! Modifiers operate on a section's private [`MeshBuffer`] copy, never on a
//! template.
//!
//! # Fluent API
//!
//! Use the `MeshApply` extension trait for method chaining:
//! ```no_run
//! use glam::Vec3;
//! use shipgen::mesh::*;
//!
//! let mut mesh: MeshBuffer = generate_diamond(1.0, 0.5, 1.0);
//! mesh.apply(Taper { amount: 0.3 })
//!     .apply(Resize { scale: Vec3::new(1.0, 0.2, 0.5) });
//! ```

use glam::Vec3;
use tracing::debug;

use super::types::MeshBuffer;

/// Largest taper magnitude; beyond this the narrow end collapses to a line
pub const MAX_TAPER: f32 = 0.95;

/// Trait for mesh modifiers
pub trait MeshModifier {
    /// Apply this modifier to a mesh, modifying it in place
    fn apply(&self, mesh: &mut MeshBuffer);
}

/// Extension trait for fluent modifier application
pub trait MeshApply {
    /// Apply a modifier and return `&mut Self` for chaining
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self;
}

impl MeshApply for MeshBuffer {
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self {
        modifier.apply(self);
        self
    }
}

/// Inverse lerp clamped to [0, 1]; 0 when the interval is empty
fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Narrow (or widen) one end of the mesh in X as a linear function of Y
///
/// Positive amounts shrink the top (max Y) end, negative amounts shrink the
/// bottom end. The scale factor at the far end is `1 - |amount|`.
///
/// # Example
/// ```no_run
/// use shipgen::mesh::*;
///
/// let mut mesh: MeshBuffer = generate_ring_hull(1.0, 0.5, 1.0, 8);
/// Taper { amount: -0.4 }.apply(&mut mesh);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taper {
    /// Taper strength, clamped to [-0.95, 0.95]
    pub amount: f32,
}

impl MeshModifier for Taper {
    fn apply(&self, mesh: &mut MeshBuffer) {
        let amount = self.amount.clamp(-MAX_TAPER, MAX_TAPER);
        let Some(bounds) = mesh.bounds() else {
            return;
        };

        let (min_y, max_y) = (bounds.min.y, bounds.max.y);
        if min_y == max_y {
            debug!("taper skipped: mesh has zero height");
            return;
        }

        let (from, to) = if amount > 0.0 {
            (min_y, max_y)
        } else {
            (max_y, min_y)
        };

        for pos in &mut mesh.positions {
            let t = inverse_lerp(from, to, pos[1]);
            let offset = 1.0 - t * amount.abs();
            pos[0] *= offset;
        }
    }
}

/// Non-uniform scale of every position
///
/// A zero scale vector means "keep the current size" rather than collapsing
/// the mesh to a point. Negative components mirror.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resize {
    pub scale: Vec3,
}

impl Resize {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            scale: Vec3::new(x, y, z),
        }
    }
}

impl MeshModifier for Resize {
    fn apply(&self, mesh: &mut MeshBuffer) {
        if self.scale == Vec3::ZERO {
            return;
        }

        for pos in &mut mesh.positions {
            *pos = (Vec3::from(*pos) * self.scale).to_array();
        }
    }
}
