//! File output for templates and generated ships

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use shipgen::assets::{stock_hull_template, stock_material, stock_wing_template};
use shipgen::config::AssetConfig;
use shipgen::obj::{ObjPart, write_mtl, write_obj, write_ship_obj};
use shipgen::{MeshBuffer, Ship};

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    Ok(BufWriter::new(file))
}

fn write_template(root: &Path, asset_path: &str, mesh: &MeshBuffer) -> Result<PathBuf> {
    let path = root.join(format!("{asset_path}.obj"));
    let name = asset_path.rsplit('/').next().unwrap_or(asset_path);
    let mut writer = create(&path)?;
    let part = ObjPart {
        name,
        mesh,
        offset: Vec3::ZERO,
        material: None,
    };
    write_obj(&mut writer, &[part], None)?;
    writer.flush()?;
    tracing::debug!("Wrote {:?}", path);
    Ok(path)
}

/// Write the stock template set under `root` at the paths named by `assets`
pub fn write_templates(root: &Path, assets: &AssetConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for n in 1..=assets.hull_templates {
        written.push(write_template(root, &assets.hull_template_path(n), &stock_hull_template(n))?);
    }
    for n in 1..=assets.wing_templates {
        written.push(write_template(root, &assets.wing_template_path(n), &stock_wing_template(n))?);
    }

    let mtl_path = root.join(format!("{}.mtl", assets.material_path()));
    let mut writer = create(&mtl_path)?;
    write_mtl(&mut writer, &[&stock_material(&assets.material)])?;
    writer.flush()?;
    written.push(mtl_path);

    Ok(written)
}

/// Export a ship as `output` plus a sibling `.mtl`, returning the MTL path
pub fn write_ship<N>(output: &Path, ship: &Ship<N>) -> Result<PathBuf> {
    let mtl_path = output.with_extension("mtl");
    let mtllib = mtl_path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Output path has no file name")?;

    let mut writer = create(output)?;
    write_ship_obj(&mut writer, ship, Some(mtllib))?;
    writer.flush()?;

    let materials: Vec<_> = ship.sections().map(|s| &s.material).collect();
    let mut writer = create(&mtl_path)?;
    write_mtl(&mut writer, &materials)?;
    writer.flush()?;

    Ok(mtl_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipgen::{HostMode, MemoryScene, ObjAssetStore, ShipGenConfig, ShipGenerator};

    #[test]
    fn test_templates_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShipGenConfig::default();

        let written = write_templates(dir.path(), &config.assets).unwrap();
        assert_eq!(written.len(), 4);
        assert!(dir.path().join("Models/hull02.obj").exists());
        assert!(dir.path().join("Materials/matTest.mtl").exists());

        let store = ObjAssetStore::load_dir(dir.path()).unwrap();
        assert_eq!(
            store.mesh_paths(),
            vec!["Models/hull01", "Models/hull02", "Models/wing01"]
        );
    }

    #[test]
    fn test_write_ship_pair() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShipGenConfig {
            seed: Some(3),
            ..ShipGenConfig::default()
        };
        write_templates(dir.path(), &config.assets).unwrap();
        let store = ObjAssetStore::load_dir(dir.path()).unwrap();

        let mut scene = MemoryScene::new();
        let ship = ShipGenerator::new(config)
            .unwrap()
            .generate_ship(&store, &mut scene, &HostMode::Standalone)
            .unwrap();

        let output = dir.path().join("out/ship.obj");
        let mtl = write_ship(&output, &ship).unwrap();

        let obj = fs::read_to_string(&output).unwrap();
        assert!(obj.starts_with("# shipgen\nmtllib ship.mtl\n"));
        assert!(obj.contains("usemtl matTest_(Hull0)"));
        let mtl = fs::read_to_string(mtl).unwrap();
        assert_eq!(
            mtl.matches("newmtl ").count(),
            ship.hull_count() + ship.wing_count()
        );
    }
}
