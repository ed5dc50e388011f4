//! Section factory
//!
//! Builds one hull or wing piece: picks a template, duplicates it, locates
//! its hardpoints, deforms the copy and binds a fresh material instance.

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use crate::config::{HullConfig, ShipGenConfig};
use crate::error::{AssetKind, Result, ShipGenError};
use crate::host::{AssetStore, Material};
use crate::mesh::{
    Direction, HardpointSet, MAX_TAPER, MeshApply, MeshBuffer, Resize, Taper, locate_with,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hull,
    Wing,
}

/// Deformation parameters of a hull section
///
/// Copied from one hull to the next to produce runs of matching sections.
/// Wings carry the zeroed default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenParameters {
    pub taper: f32,
    pub size: Vec3,
}

impl GenParameters {
    pub fn new(taper: f32, size: Vec3) -> Self {
        Self { taper, size }
    }

    /// Draw fresh hull parameters
    ///
    /// Size is a random direction scaled by `2 * (1 + |taper|)`, so strongly
    /// tapered sections come out proportionally larger.
    pub fn random<R: Rng>(hull: &HullConfig, rng: &mut R) -> Self {
        let [taper_lo, taper_hi] = hull.taper_range;
        let [size_lo, size_hi] = hull.size_range;

        let taper = rng
            .random_range(taper_lo..=taper_hi)
            .clamp(-MAX_TAPER, MAX_TAPER);
        let raw = Vec3::new(
            rng.random_range(size_lo..=size_hi),
            rng.random_range(size_lo..=size_hi),
            rng.random_range(size_lo..=size_hi),
        );
        let size = raw.normalize() * 2.0 * (1.0 + taper.abs());

        Self { taper, size }
    }
}

/// One generated piece of a ship
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    /// `Hull{index}` or `Wing{index}`
    pub name: String,
    /// Private, deformed copy of the template
    pub mesh: MeshBuffer,
    /// Located on the undeformed copy; indices stay valid after deformation
    pub hardpoints: HardpointSet,
    pub params: GenParameters,
    /// Position relative to the ship root
    pub position: Vec3,
    pub material: Material,
}

impl Section {
    /// Hardpoint position in the section's own space
    pub fn hardpoint_local(&self, direction: Direction) -> Option<Vec3> {
        self.hardpoints
            .get(direction)
            .and_then(|index| self.mesh.vertex_at(index))
    }

    /// Hardpoint position in ship space
    pub fn hardpoint_world(&self, direction: Direction) -> Option<Vec3> {
        self.hardpoint_local(direction).map(|p| self.position + p)
    }
}

/// Position for `part` that makes its `part_dir` hardpoint coincide with the
/// `anchor_dir` hardpoint of `anchor`
///
/// `None` when either hardpoint is absent.
pub fn attach_offset(
    anchor: &Section,
    anchor_dir: Direction,
    part: &Section,
    part_dir: Direction,
) -> Option<Vec3> {
    Some(anchor.hardpoint_world(anchor_dir)? - part.hardpoint_local(part_dir)?)
}

/// Builds sections from the templates in an asset store
pub struct SectionFactory<'a, A: AssetStore + ?Sized> {
    assets: &'a A,
    config: &'a ShipGenConfig,
}

impl<'a, A: AssetStore + ?Sized> SectionFactory<'a, A> {
    pub fn new(assets: &'a A, config: &'a ShipGenConfig) -> Self {
        Self { assets, config }
    }

    /// Generate hull section `index`
    ///
    /// Sections 0 and 1 always draw fresh parameters. Later sections copy
    /// `parent` with the configured inheritance probability.
    pub fn generate_hull<R: Rng>(
        &self,
        index: usize,
        parent: Option<&GenParameters>,
        rng: &mut R,
    ) -> Result<Section> {
        let template_id = rng.random_range(1..=self.config.assets.hull_templates);
        let path = self.config.assets.hull_template_path(template_id);
        let name = format!("Hull{index}");
        let (mut mesh, hardpoints, material) = self.load_template(&path, &name)?;

        let params = match parent {
            Some(parent) if index > 1 && rng.random_bool(self.config.hull.inherit_probability) => {
                *parent
            }
            _ => GenParameters::random(&self.config.hull, rng),
        };

        mesh.apply(Taper {
            amount: params.taper,
        })
        .apply(Resize { scale: params.size });

        debug!(
            "{name}: template {path}, taper {:.3}, size {:?}, {} hardpoints",
            params.taper,
            params.size,
            hardpoints.len()
        );

        Ok(Section {
            kind: SectionKind::Hull,
            name,
            mesh,
            hardpoints,
            params,
            position: Vec3::ZERO,
            material,
        })
    }

    /// Generate wing section `index`, flattened by the configured wing scale
    pub fn generate_wing<R: Rng>(&self, index: usize, rng: &mut R) -> Result<Section> {
        let template_id = rng.random_range(1..=self.config.assets.wing_templates);
        let path = self.config.assets.wing_template_path(template_id);
        let name = format!("Wing{index}");
        let (mut mesh, hardpoints, material) = self.load_template(&path, &name)?;

        mesh.apply(Resize {
            scale: self.config.wing.scale(),
        });

        debug!("{name}: template {path}, {} hardpoints", hardpoints.len());

        Ok(Section {
            kind: SectionKind::Wing,
            name,
            mesh,
            hardpoints,
            params: GenParameters::default(),
            position: Vec3::ZERO,
            material,
        })
    }

    /// Duplicate a template mesh, locate its hardpoints and instantiate the
    /// base material for `name`
    fn load_template(
        &self,
        path: &str,
        name: &str,
    ) -> Result<(MeshBuffer, HardpointSet, Material)> {
        let template = self
            .assets
            .load_mesh(path)
            .ok_or_else(|| ShipGenError::AssetNotFound {
                kind: AssetKind::Mesh,
                path: path.to_string(),
            })?;

        let material_path = self.config.assets.material_path();
        let material = self
            .assets
            .load_material(&material_path)
            .ok_or(ShipGenError::AssetNotFound {
                kind: AssetKind::Material,
                path: material_path,
            })?;

        let mesh = template.duplicate();
        mesh.validate().map_err(|e| match e {
            ShipGenError::InvalidMesh(msg) => ShipGenError::InvalidMesh(format!("{path}: {msg}")),
            other => other,
        })?;
        let hardpoints = locate_with(&mesh, self.config.hardpoints.policy);

        Ok((mesh, hardpoints, material.instantiate(name)))
    }
}
