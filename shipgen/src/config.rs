//! Generator configuration (ship.toml)
//!
//! Every field has a default matching the stock template set, so an empty
//! file (or no file at all) is a valid configuration.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, ShipGenError};
use crate::mesh::{HardpointPolicy, MAX_TAPER};

/// Top-level generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipGenConfig {
    /// Fixed RNG seed; a random seed is drawn (and logged) when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Name of the ship root node; also the marker used to find old ships
    pub ship_name: String,
    pub assets: AssetConfig,
    pub hull: HullConfig,
    pub wing: WingConfig,
    pub hardpoints: HardpointConfig,
}

/// Where section templates and the base material live in the asset store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory of `hullNN` / `wingNN` meshes (default: "Models")
    pub sections_dir: String,
    /// Directory of materials (default: "Materials")
    pub materials_dir: String,
    /// Base material shared by every section (default: "matTest")
    pub material: String,
    /// Number of hull templates, `hull01..=hullNN` (default: 2)
    pub hull_templates: u32,
    /// Number of wing templates, `wing01..=wingNN` (default: 1)
    pub wing_templates: u32,
}

/// Hull spine generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullConfig {
    /// Inclusive range of hull sections per ship (default: [2, 6])
    pub count: [u32; 2],
    /// Inclusive range of fresh taper values (default: [-0.5, 0.5])
    pub taper_range: [f32; 2],
    /// Inclusive range of each raw size component before normalization (default: [0.5, 1.0])
    pub size_range: [f32; 2],
    /// Chance that a section past index 1 copies its predecessor's parameters (default: 0.6)
    pub inherit_probability: f64,
}

/// Wing generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WingConfig {
    /// Fixed resize applied to every wing (default: [1.0, 0.2, 0.5])
    pub scale: [f32; 3],
    /// Chance that a hull section gets wings while the budget lasts (default: 2/3)
    pub attach_probability: f64,
}

/// What to do when a section lacks a hardpoint needed for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingHardpointPolicy {
    /// Log a warning and keep going without that joint
    #[default]
    Skip,
    /// Fail the whole generation
    Abort,
}

/// Hardpoint handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HardpointConfig {
    pub policy: HardpointPolicy,
    pub missing: MissingHardpointPolicy,
}

impl Default for ShipGenConfig {
    fn default() -> Self {
        Self {
            seed: None,
            ship_name: "Ship".to_string(),
            assets: AssetConfig::default(),
            hull: HullConfig::default(),
            wing: WingConfig::default(),
            hardpoints: HardpointConfig::default(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            sections_dir: "Models".to_string(),
            materials_dir: "Materials".to_string(),
            material: "matTest".to_string(),
            hull_templates: 2,
            wing_templates: 1,
        }
    }
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            count: [2, 6],
            taper_range: [-0.5, 0.5],
            size_range: [0.5, 1.0],
            inherit_probability: 0.6,
        }
    }
}

impl Default for WingConfig {
    fn default() -> Self {
        Self {
            scale: [1.0, 0.2, 0.5],
            attach_probability: 2.0 / 3.0,
        }
    }
}

impl AssetConfig {
    /// Asset path of hull template `n` (1-based), e.g. `Models/hull01`
    pub fn hull_template_path(&self, n: u32) -> String {
        format!("{}/hull{:02}", self.sections_dir, n)
    }

    /// Asset path of wing template `n` (1-based), e.g. `Models/wing01`
    pub fn wing_template_path(&self, n: u32) -> String {
        format!("{}/wing{:02}", self.sections_dir, n)
    }

    /// Asset path of the base material, e.g. `Materials/matTest`
    pub fn material_path(&self) -> String {
        format!("{}/{}", self.materials_dir, self.material)
    }
}

impl WingConfig {
    pub fn scale(&self) -> Vec3 {
        Vec3::from(self.scale)
    }
}

impl ShipGenConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate a TOML configuration string
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::from)?)
    }

    /// Check ranges, probabilities and pool sizes
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ShipGenError::InvalidConfig(msg));

        if self.ship_name.is_empty() {
            return invalid("ship_name must not be empty".to_string());
        }
        if self.assets.hull_templates == 0 || self.assets.wing_templates == 0 {
            return invalid("template pools must hold at least one template".to_string());
        }

        let [min_hulls, max_hulls] = self.hull.count;
        if min_hulls < 2 || min_hulls > max_hulls {
            return invalid(format!(
                "hull.count must satisfy 2 <= min <= max, got [{min_hulls}, {max_hulls}]"
            ));
        }

        for (name, [lo, hi]) in [
            ("hull.taper_range", self.hull.taper_range),
            ("hull.size_range", self.hull.size_range),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return invalid(format!(
                    "{name} must be an ordered finite range, got [{lo}, {hi}]"
                ));
            }
        }
        let [taper_lo, taper_hi] = self.hull.taper_range;
        if taper_lo < -MAX_TAPER || taper_hi > MAX_TAPER {
            return invalid(format!(
                "hull.taper_range must lie within ±{MAX_TAPER}, got [{taper_lo}, {taper_hi}]"
            ));
        }
        if self.hull.size_range[0] <= 0.0 {
            return invalid("hull.size_range must be positive".to_string());
        }

        for (name, p) in [
            ("hull.inherit_probability", self.hull.inherit_probability),
            ("wing.attach_probability", self.wing.attach_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} must be within [0, 1], got {p}"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = ShipGenConfig::from_toml_str("").unwrap();
        assert_eq!(config, ShipGenConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = ShipGenConfig::from_toml_str(
            r#"
            seed = 7
            ship_name = "Cruiser"

            [hull]
            count = [3, 3]

            [hardpoints]
            policy = "extremal"
            missing = "abort"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.ship_name, "Cruiser");
        assert_eq!(config.hull.count, [3, 3]);
        assert_eq!(config.hull.taper_range, [-0.5, 0.5]);
        assert_eq!(config.hardpoints.policy, HardpointPolicy::Extremal);
        assert_eq!(config.hardpoints.missing, MissingHardpointPolicy::Abort);
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = ShipGenConfig::default();
        config.seed = Some(99);
        config.wing.scale = [2.0, 0.1, 0.4];

        let text = config.to_toml_string().unwrap();
        assert_eq!(ShipGenConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_asset_paths() {
        let assets = AssetConfig::default();
        assert_eq!(assets.hull_template_path(1), "Models/hull01");
        assert_eq!(assets.hull_template_path(12), "Models/hull12");
        assert_eq!(assets.wing_template_path(1), "Models/wing01");
        assert_eq!(assets.material_path(), "Materials/matTest");
    }

    #[test]
    fn test_rejects_single_hull() {
        let result = ShipGenConfig::from_toml_str("[hull]\ncount = [1, 4]\n");
        assert!(matches!(result, Err(ShipGenError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let result = ShipGenConfig::from_toml_str("[wing]\nattach_probability = 1.5\n");
        assert!(matches!(result, Err(ShipGenError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unordered_range() {
        let result = ShipGenConfig::from_toml_str("[hull]\ntaper_range = [0.5, -0.5]\n");
        assert!(matches!(result, Err(ShipGenError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_taper_out_of_range() {
        for range in ["[2.0, 3.0]", "[-1.0, 0.5]", "[0.0, 0.96]"] {
            let text = format!("[hull]\ntaper_range = {range}\n");
            let result = ShipGenConfig::from_toml_str(&text);
            assert!(
                matches!(result, Err(ShipGenError::InvalidConfig(_))),
                "{range} accepted"
            );
        }
        assert!(ShipGenConfig::from_toml_str("[hull]\ntaper_range = [-0.95, 0.95]\n").is_ok());
    }

    #[test]
    fn test_parse_error() {
        let result = ShipGenConfig::from_toml_str("seed = \"not a number\"");
        assert!(matches!(result, Err(ShipGenError::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ShipGenConfig::load(Path::new("/nonexistent/ship.toml"));
        assert!(matches!(result, Err(ShipGenError::Config(ConfigError::Io { .. }))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ship.toml");
        std::fs::write(&path, "ship_name = \"Frigate\"\n").unwrap();

        let config = ShipGenConfig::load(&path).unwrap();
        assert_eq!(config.ship_name, "Frigate");
    }
}
