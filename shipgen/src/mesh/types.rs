//! Mesh buffer types
//!
//! Shared vertex storage for section templates and the deformed copies built
//! from them.

use glam::Vec3;

use crate::error::{Result, ShipGenError};

/// Trait for mesh construction - lets template generators write into any buffer
pub trait MeshBuilder: Default {
    /// Add a vertex with position and normal, returning its index
    fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u16;

    /// Add a triangle using three vertex indices
    fn add_triangle(&mut self, i0: u16, i1: u16, i2: u16);
}

/// Trait extension for UV-mapped meshes
pub trait MeshBuilderUV: MeshBuilder {
    /// Add a vertex with position, UV coordinates, and normal, returning its index
    fn add_vertex_uv(&mut self, position: Vec3, uv: (f32, f32), normal: Vec3) -> u16;
}

/// Largest vertex count addressable by u16 indices
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Axis-aligned bounding box derived from a buffer's positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Extent along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Raw vertex/normal/UV/index arrays (f32 format)
///
/// `normals` and `uvs` run parallel to `positions`; `indices` holds whole
/// triangles. Template buffers are never deformed in place: sections work on
/// a [`MeshBuffer::duplicate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    /// Vertex positions as [x, y, z]
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals as [x, y, z]
    pub normals: Vec<[f32; 3]>,
    /// UV coordinates as [u, v]
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices (u16 for GPU compatibility)
    pub indices: Vec<u16>,
}

impl MeshBuffer {
    /// Create empty mesh buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from raw arrays, checking the parallel-array invariants
    pub fn from_parts(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
        indices: Vec<u16>,
    ) -> Result<Self> {
        let mesh = Self {
            positions,
            normals,
            uvs,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Copy every array into a buffer with independent storage
    pub fn duplicate(&self) -> Self {
        Self {
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            indices: self.indices.clone(),
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of a vertex, if the index is in range
    pub fn vertex_at(&self, index: u16) -> Option<Vec3> {
        self.positions.get(index as usize).copied().map(Vec3::from)
    }

    /// Bounding box of all positions, `None` for an empty buffer
    pub fn bounds(&self) -> Option<Aabb> {
        let mut iter = self.positions.iter().copied().map(Vec3::from);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Aabb { min, max })
    }

    /// Check that normals and UVs are parallel to positions and that every
    /// index addresses an existing vertex
    pub fn validate(&self) -> Result<()> {
        let count = self.positions.len();
        if count > MAX_VERTICES {
            return Err(ShipGenError::InvalidMesh(format!(
                "{count} vertices exceed the u16 index limit of {MAX_VERTICES}"
            )));
        }
        if self.normals.len() != count {
            return Err(ShipGenError::InvalidMesh(format!(
                "{} normals for {} vertices",
                self.normals.len(),
                count
            )));
        }
        if self.uvs.len() != count {
            return Err(ShipGenError::InvalidMesh(format!(
                "{} uvs for {} vertices",
                self.uvs.len(),
                count
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(ShipGenError::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(ShipGenError::InvalidMesh(format!(
                "index {} out of range for {} vertices",
                bad, count
            )));
        }
        Ok(())
    }
}

impl MeshBuilder for MeshBuffer {
    fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u16 {
        self.add_vertex_uv(position, (0.0, 0.0), normal)
    }

    fn add_triangle(&mut self, i0: u16, i1: u16, i2: u16) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }
}

impl MeshBuilderUV for MeshBuffer {
    fn add_vertex_uv(&mut self, position: Vec3, uv: (f32, f32), normal: Vec3) -> u16 {
        let index = self.positions.len() as u16;
        self.positions.push([position.x, position.y, position.z]);
        self.normals.push([normal.x, normal.y, normal.z]);
        self.uvs.push([uv.0, uv.1]);
        index
    }
}
