//! Asset store implementations
//!
//! - [`MemoryAssetStore`]: templates held in memory, keyed by asset path
//! - [`ObjAssetStore`]: every `.obj`/`.mtl` file below a directory, loaded up front

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hashbrown::HashMap;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::AssetConfig;
use crate::host::{AssetStore, Material};
use crate::mesh::{MeshBuffer, generate_diamond, generate_ring_hull};
use crate::obj::{parse_mtl, parse_obj};

/// Hull template `n` of the stock set
///
/// Odd ids are elliptical prisms, even ids are diamonds; both grow slightly
/// longer with the id so larger pools stay varied.
pub fn stock_hull_template(n: u32) -> MeshBuffer {
    let stretch = 1.0 + 0.2 * (n.saturating_sub(1) / 2) as f32;
    if n % 2 == 1 {
        generate_ring_hull(1.0, 0.6, stretch, 12)
    } else {
        generate_diamond(1.0, 0.8, 1.2 * stretch)
    }
}

/// Wing template `n` of the stock set (before the wing flattening resize)
pub fn stock_wing_template(n: u32) -> MeshBuffer {
    generate_diamond(1.0 + 0.25 * n.saturating_sub(1) as f32, 1.0, 1.0)
}

/// The stock base material
pub fn stock_material(name: &str) -> Material {
    Material {
        name: name.to_string(),
        base_color: [0.62, 0.66, 0.72, 1.0],
    }
}

/// In-memory template store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    meshes: HashMap<String, MeshBuffer>,
    materials: HashMap<String, Material>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the stock hull/wing templates and base material at the
    /// paths named by `assets`
    pub fn with_default_templates(assets: &AssetConfig) -> Self {
        let mut store = Self::new();
        for n in 1..=assets.hull_templates {
            store.insert_mesh(assets.hull_template_path(n), stock_hull_template(n));
        }
        for n in 1..=assets.wing_templates {
            store.insert_mesh(assets.wing_template_path(n), stock_wing_template(n));
        }
        store.insert_material(assets.material_path(), stock_material(&assets.material));
        store
    }

    pub fn insert_mesh(&mut self, path: impl Into<String>, mesh: MeshBuffer) {
        self.meshes.insert(path.into(), mesh);
    }

    pub fn insert_material(&mut self, path: impl Into<String>, material: Material) {
        self.materials.insert(path.into(), material);
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Asset paths of all meshes, sorted
    pub fn mesh_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.meshes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl AssetStore for MemoryAssetStore {
    fn load_mesh(&self, path: &str) -> Option<&MeshBuffer> {
        self.meshes.get(path)
    }

    fn load_material(&self, path: &str) -> Option<&Material> {
        self.materials.get(path)
    }
}

/// Template store backed by a directory of Wavefront files
///
/// `Models/hull01.obj` is served as mesh `Models/hull01`; each `newmtl` in
/// `Materials/ship.mtl` is served as `Materials/<name>`.
#[derive(Debug, Clone)]
pub struct ObjAssetStore {
    root: PathBuf,
    store: MemoryAssetStore,
}

impl ObjAssetStore {
    /// Load every `.obj` and `.mtl` file below `root`
    pub fn load_dir(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("Asset directory not found: {:?}", root);
        }

        let mut store = MemoryAssetStore::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", root))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_lowercase())
                .unwrap_or_default();

            match ext.as_str() {
                "obj" => {
                    let file = File::open(path)
                        .with_context(|| format!("Failed to open OBJ: {:?}", path))?;
                    let mesh = parse_obj(BufReader::new(file))
                        .with_context(|| format!("Failed to parse OBJ: {:?}", path))?;
                    let key = asset_key(root, &path.with_extension(""));
                    debug!("Loaded mesh {key}: {} vertices", mesh.vertex_count());
                    store.insert_mesh(key, mesh);
                }
                "mtl" => {
                    let file = File::open(path)
                        .with_context(|| format!("Failed to open MTL: {:?}", path))?;
                    let materials = parse_mtl(BufReader::new(file))
                        .with_context(|| format!("Failed to parse MTL: {:?}", path))?;
                    let dir = path.parent().unwrap_or(root);
                    for material in materials {
                        let key = asset_key(root, &dir.join(&material.name));
                        debug!("Loaded material {key}");
                        store.insert_material(key, material);
                    }
                }
                _ => {}
            }
        }

        info!(
            "Loaded {} meshes and {} materials from {:?}",
            store.mesh_count(),
            store.material_count(),
            root
        );

        Ok(Self {
            root: root.to_path_buf(),
            store,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mesh_paths(&self) -> Vec<&str> {
        self.store.mesh_paths()
    }
}

impl AssetStore for ObjAssetStore {
    fn load_mesh(&self, path: &str) -> Option<&MeshBuffer> {
        self.store.load_mesh(path)
    }

    fn load_material(&self, path: &str) -> Option<&Material> {
        self.store.load_material(path)
    }
}

/// `root/Models/hull01` -> `Models/hull01`, always with forward slashes
fn asset_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
