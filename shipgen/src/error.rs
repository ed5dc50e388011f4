//! Ship generation error types

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::mesh::Direction;

/// Result alias used throughout the generator.
pub type Result<T> = std::result::Result<T, ShipGenError>;

/// Which kind of template asset failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Mesh,
    Material,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Mesh => f.write_str("mesh"),
            AssetKind::Material => f.write_str("material"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ShipGenError {
    /// A template mesh or material is missing from the asset store.
    #[error("{kind} asset not found: {path}")]
    AssetNotFound { kind: AssetKind, path: String },

    /// A section needed for placement has no vertex on the required axis.
    #[error("section {section} has no {direction} hardpoint")]
    HardpointMissing {
        section: String,
        direction: Direction,
    },

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
