//! ship-gen - procedural spaceship generator
//!
//! Writes the stock section templates, assembles ships from a template
//! directory and exports them as Wavefront OBJ/MTL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shipgen::{HostMode, MemoryScene, ObjAssetStore, ShipGenConfig, ShipGenerator};

mod export;

#[derive(Parser)]
#[command(name = "ship-gen")]
#[command(about = "Procedural spaceship generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the stock hull/wing templates and base material
    Templates {
        /// Asset root to populate
        dir: PathBuf,

        /// Configuration naming the template directories and pool sizes
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate ships from a template directory and export the last one
    Generate {
        /// Asset root holding the section templates and materials
        #[arg(short, long, default_value = "assets")]
        assets: PathBuf,

        /// Generator configuration (ship.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// RNG seed (overrides the configuration)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output OBJ file; the MTL is written next to it
        #[arg(short, long, default_value = "ship.obj")]
        output: PathBuf,

        /// Number of ships to generate into the scene
        #[arg(
            short = 'n',
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        count: u32,

        /// Behave like an idle editor (each ship replaces the previous one)
        #[arg(long)]
        editor: bool,
    },

    /// Print the default configuration as TOML
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<ShipGenConfig> {
    match path {
        Some(path) => {
            ShipGenConfig::load(path).with_context(|| format!("Failed to load config {:?}", path))
        }
        None => Ok(ShipGenConfig::default()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Templates { dir, config } => {
            let config = load_config(config.as_ref())?;
            let written = export::write_templates(&dir, &config.assets)?;
            tracing::info!("Wrote {} template files to {:?}", written.len(), dir);
        }

        Commands::Generate {
            assets,
            config,
            seed,
            output,
            count,
            editor,
        } => {
            let mut config = load_config(config.as_ref())?;
            if seed.is_some() {
                config.seed = seed;
            }

            let store = ObjAssetStore::load_dir(&assets)?;
            let mode = if editor {
                HostMode::Editor
            } else {
                HostMode::Standalone
            };

            let mut scene = MemoryScene::new();
            let mut generator = ShipGenerator::new(config)?;
            let mut ship = generator.generate_ship(&store, &mut scene, &mode)?;
            for _ in 1..count {
                ship = generator.generate_ship(&store, &mut scene, &mode)?;
            }
            tracing::info!("Scene holds {} nodes", scene.len());

            let mtl = export::write_ship(&output, &ship)?;
            tracing::info!("Exported {:?} and {:?}", output, mtl);
            if let Some(seed) = generator.seed() {
                tracing::info!("Replay with --seed {}", seed);
            }
        }

        Commands::Config => {
            print!("{}", ShipGenConfig::default().to_toml_string()?);
        }
    }

    Ok(())
}
