//! Procedural spaceship assembly
//!
//! Ships are assembled from hull and wing section templates. Each section is
//! a private copy of its template, deformed (taper, non-uniform resize) and
//! joined to its neighbours through axis-aligned hardpoint vertices.
//!
//! ```no_run
//! use shipgen::{HostMode, MemoryAssetStore, MemoryScene, ShipGenConfig, ShipGenerator};
//!
//! let config = ShipGenConfig::default();
//! let assets = MemoryAssetStore::with_default_templates(&config.assets);
//! let mut scene = MemoryScene::new();
//!
//! let mut generator = ShipGenerator::new(config)?;
//! let ship = generator.generate_ship(&assets, &mut scene, &HostMode::Standalone)?;
//! println!("{} hulls, {} wings", ship.hull_count(), ship.wing_count());
//! # Ok::<(), shipgen::ShipGenError>(())
//! ```

pub mod assembler;
pub mod assets;
pub mod config;
pub mod error;
pub mod host;
pub mod mesh;
pub mod obj;
pub mod scene;
pub mod section;

pub use assembler::{Ship, ShipBlueprint, ShipGenerator, Side, clear_ships};
pub use assets::{MemoryAssetStore, ObjAssetStore};
pub use config::{MissingHardpointPolicy, ShipGenConfig};
pub use error::{Result, ShipGenError};
pub use host::{AssetStore, HostEnvironment, HostMode, Material, SceneGraph};
pub use mesh::{Direction, HardpointSet, MeshBuffer};
pub use scene::{MemoryScene, NodeId};
pub use section::{GenParameters, Section, SectionFactory, SectionKind};
