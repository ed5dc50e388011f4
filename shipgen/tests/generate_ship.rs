//! End-to-end ship generation against in-memory hosts

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use shipgen::assets::{stock_hull_template, stock_material, stock_wing_template};
use shipgen::mesh::{MeshBuilder, locate};
use shipgen::obj::{ObjPart, write_mtl, write_obj, write_ship_obj};
use shipgen::{
    Direction, HostMode, MemoryAssetStore, MemoryScene, MeshBuffer, ObjAssetStore, SceneGraph,
    ShipGenConfig, ShipGenError, ShipGenerator,
};

/// Cube spanning [-1, 1] with a vertex at the centre of every face
fn cube_template() -> MeshBuffer {
    let mut mesh = MeshBuffer::new();
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        for normal in [axis, -axis] {
            let (u, v) = if axis == Vec3::Y {
                (Vec3::X, Vec3::Z)
            } else {
                (Vec3::Y, axis.cross(Vec3::Y))
            };
            let centre = mesh.add_vertex(normal, normal);
            let corners =
                [u + v, u - v, -u - v, -u + v].map(|c| mesh.add_vertex(normal + c, normal));
            for i in 0..4 {
                mesh.add_triangle(centre, corners[i], corners[(i + 1) % 4]);
            }
        }
    }
    mesh
}

fn flat_config() -> ShipGenConfig {
    let mut config = ShipGenConfig::default();
    config.assets.hull_templates = 1;
    config.hull.taper_range = [0.0, 0.0];
    config.hull.size_range = [1.0, 1.0];
    config
}

fn generator(config: ShipGenConfig, seed: u64) -> ShipGenerator {
    ShipGenerator::with_rng(config, Pcg64::seed_from_u64(seed)).unwrap()
}

#[test]
fn test_cube_template_hardpoints() {
    let cube = cube_template();
    let set = locate(&cube);
    assert_eq!(cube.vertex_at(set.get(Direction::Forward).unwrap()), Some(Vec3::Z));
    assert_eq!(cube.vertex_at(set.get(Direction::Back).unwrap()), Some(-Vec3::Z));
    assert!(cube.validate().is_ok());
}

#[test]
fn test_spine_and_wing_counts() {
    let config = ShipGenConfig::default();
    let assets = MemoryAssetStore::with_default_templates(&config.assets);

    for seed in 0..100 {
        let mut scene = MemoryScene::new();
        let ship = generator(config.clone(), seed)
            .generate_ship(&assets, &mut scene, &HostMode::Standalone)
            .unwrap();

        let n = ship.hull_count();
        assert!((2..=6).contains(&n), "seed {seed}: {n} hulls");
        assert!(ship.wing_budget >= 2 && ship.wing_budget < 2 * n);
        assert!(ship.wing_count() <= ship.wing_budget);
        for wing in &ship.wings {
            assert!(wing.hull_index < n);
        }
    }
}

#[test]
fn test_cube_spine_laid_end_to_end() {
    let config = flat_config();
    let mut assets = MemoryAssetStore::with_default_templates(&config.assets);
    assets.insert_mesh("Models/hull01", cube_template());
    let scale = 2.0 / 3f32.sqrt();

    for seed in 0..20 {
        let mut scene = MemoryScene::new();
        let ship = generator(config.clone(), seed)
            .generate_ship(&assets, &mut scene, &HostMode::Standalone)
            .unwrap();

        for (i, hull) in ship.hulls.iter().enumerate() {
            let expected = Vec3::new(0.0, 0.0, i as f32 * 2.0 * scale);
            let position = scene.world_position(hull.node).unwrap();
            assert!(
                position.distance(expected) < 1e-5,
                "seed {seed}: hull {i} at {position}, expected {expected}"
            );
            assert!((hull.section.params.size - Vec3::splat(scale)).abs().max_element() < 1e-6);
        }
    }
}

#[test]
fn test_editor_regeneration_replaces_ship() {
    let config = ShipGenConfig::default();
    let assets = MemoryAssetStore::with_default_templates(&config.assets);
    let mut scene = MemoryScene::new();
    let camera = scene.create_node("Camera");
    let mut generator = generator(config, 1);

    let first = generator
        .generate_ship(&assets, &mut scene, &HostMode::Editor)
        .unwrap();
    let second = generator
        .generate_ship(&assets, &mut scene, &HostMode::Editor)
        .unwrap();

    assert!(!scene.contains(first.root));
    assert!(first.hulls.iter().all(|h| !scene.contains(h.node)));
    assert!(scene.contains(second.root));
    assert!(scene.contains(camera));
    assert_eq!(scene.roots(), vec![camera, second.root]);
}

#[test]
fn test_runtime_generation_keeps_old_ships() {
    let config = ShipGenConfig::default();
    let assets = MemoryAssetStore::with_default_templates(&config.assets);
    let mut generator = generator(config, 2);

    for mode in [HostMode::Standalone, HostMode::EditorPlaying] {
        let mut scene = MemoryScene::new();
        let first = generator.generate_ship(&assets, &mut scene, &mode).unwrap();
        let second = generator.generate_ship(&assets, &mut scene, &mode).unwrap();

        assert!(scene.contains(first.root));
        assert!(scene.contains(second.root));
        assert_eq!(scene.roots().len(), 2);
    }
}

#[test]
fn test_missing_template_leaves_scene_untouched() {
    let config = ShipGenConfig::default();
    let mut assets = MemoryAssetStore::new();
    assets.insert_material(config.assets.material_path(), stock_material("matTest"));

    let mut scene = MemoryScene::new();
    let old = scene.create_node("Ship");

    let err = generator(config, 3)
        .generate_ship(&assets, &mut scene, &HostMode::Editor)
        .unwrap_err();

    assert!(matches!(err, ShipGenError::AssetNotFound { .. }));
    assert_eq!(scene.find_all_nodes(), vec![old]);
}

#[test]
fn test_same_seed_same_ship() {
    let config = ShipGenConfig {
        seed: Some(1234),
        ..ShipGenConfig::default()
    };
    let assets = MemoryAssetStore::with_default_templates(&config.assets);

    let build = || {
        let mut scene = MemoryScene::new();
        let ship = ShipGenerator::new(config.clone())
            .unwrap()
            .generate_ship(&assets, &mut scene, &HostMode::Standalone)
            .unwrap();
        ship.sections()
            .map(|s| (s.name.clone(), s.position, s.params, s.mesh.clone()))
            .collect::<Vec<_>>()
    };

    assert_eq!(build(), build());
}

#[test]
fn test_renderers_get_private_materials() {
    let config = ShipGenConfig::default();
    let assets = MemoryAssetStore::with_default_templates(&config.assets);
    let mut scene = MemoryScene::new();

    let ship = generator(config, 5)
        .generate_ship(&assets, &mut scene, &HostMode::Standalone)
        .unwrap();

    for hull in &ship.hulls {
        let renderer = scene.renderer(hull.node).unwrap();
        assert_eq!(renderer.material.name, format!("matTest ({})", hull.section.name));
        assert_eq!(renderer.mesh, hull.section.mesh);
    }
}

#[test]
fn test_config_file_drives_generation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ship.toml");
    std::fs::write(
        &path,
        concat!(
            "seed = 9\nship_name = \"Cruiser\"\n\n",
            "[hull]\ncount = [4, 4]\n\n",
            "[hardpoints]\nmissing = \"abort\"\n",
        ),
    )
    .unwrap();

    let config = ShipGenConfig::load(&path).unwrap();
    let assets = MemoryAssetStore::with_default_templates(&config.assets);
    let mut scene = MemoryScene::new();
    let ship = ShipGenerator::new(config)
        .unwrap()
        .generate_ship(&assets, &mut scene, &HostMode::Standalone)
        .unwrap();

    assert_eq!(ship.name, "Cruiser");
    assert_eq!(ship.hull_count(), 4);
    assert_eq!(scene.node_name(ship.root), Some("Cruiser"));
}

#[test]
fn test_generate_from_obj_directory() {
    let config = ShipGenConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("Models");
    let materials = dir.path().join("Materials");
    std::fs::create_dir_all(&models).unwrap();
    std::fs::create_dir_all(&materials).unwrap();

    let templates = [
        ("hull01", stock_hull_template(1)),
        ("hull02", stock_hull_template(2)),
        ("wing01", stock_wing_template(1)),
    ];
    for (name, mesh) in &templates {
        let mut file = std::fs::File::create(models.join(format!("{name}.obj"))).unwrap();
        let part = ObjPart {
            name,
            mesh,
            offset: Vec3::ZERO,
            material: None,
        };
        write_obj(&mut file, &[part], None).unwrap();
    }
    let mut mtl = std::fs::File::create(materials.join("matTest.mtl")).unwrap();
    write_mtl(&mut mtl, &[&stock_material("matTest")]).unwrap();
    drop(mtl);

    let assets = ObjAssetStore::load_dir(dir.path()).unwrap();
    let mut scene = MemoryScene::new();
    let ship = generator(config, 11)
        .generate_ship(&assets, &mut scene, &HostMode::Standalone)
        .unwrap();

    for pair in ship.hulls.windows(2) {
        let front = pair[0].section.hardpoint_world(Direction::Forward).unwrap();
        let back = pair[1].section.hardpoint_world(Direction::Back).unwrap();
        assert!(front.distance(back) < 1e-5);
    }

    let mut exported = Vec::new();
    write_ship_obj(&mut exported, &ship, Some("ship.mtl")).unwrap();
    let text = String::from_utf8(exported).unwrap();
    assert_eq!(
        text.matches("\no ").count(),
        ship.hull_count() + ship.wing_count()
    );
}
