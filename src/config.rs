//! Demo configuration, loadable from JSON with sensible defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::types::Result;
use crate::core::Error;

/// Tunable parameters for the island demo. Every field has a default so a
/// missing or partial config file still runs.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Seed for vegetation placement and particle jitter
    pub seed: u64,
    /// Grayscale heightmap image; generated terrain is used when absent
    pub heightmap: Option<PathBuf>,
    pub terrain_width: usize,
    pub terrain_depth: usize,
    pub min_height: f32,
    pub max_height: f32,
    pub water_height: f32,
    pub lava_height: f32,
    pub lava_radius: f32,
    pub cloud_height: f32,
    pub tree_count: usize,
    pub exclusion_half_width: f32,
    pub exclusion_half_depth: f32,
    /// Full day/night cycle length in seconds
    pub day_period: f32,
    /// Margin added on every side of the fitted shadow box
    pub shadow_offset: f32,
    /// Camera-frustum far distance used for shadow fitting
    pub shadow_distance: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            heightmap: None,
            terrain_width: 256,
            terrain_depth: 256,
            min_height: -64.0,
            max_height: 64.0,
            water_height: -40.0,
            lava_height: 16.0,
            lava_radius: 12.0,
            cloud_height: 50.0,
            tree_count: 400,
            exclusion_half_width: 50.0,
            exclusion_half_depth: 40.0,
            day_period: 30.0,
            shadow_offset: 10.0,
            shadow_distance: 200.0,
        }
    }
}

impl DemoConfig {
    /// Load from a JSON file, filling unspecified fields with defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file when a path is given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.terrain_width < 2 || self.terrain_depth < 2 {
            return Err(Error::Config(format!(
                "terrain dimensions {}x{} too small",
                self.terrain_width, self.terrain_depth,
            )));
        }
        if self.max_height <= self.min_height {
            return Err(Error::Config(
                "max_height must exceed min_height".to_string(),
            ));
        }
        if self.day_period <= 0.0 {
            return Err(Error::Config("day_period must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DemoConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: DemoConfig =
            serde_json::from_str(r#"{ "tree_count": 50, "water_height": -60.0 }"#).unwrap();
        assert_eq!(config.tree_count, 50);
        assert_eq!(config.water_height, -60.0);
        assert_eq!(config.day_period, 30.0);
    }

    #[test]
    fn test_rejects_inverted_height_range() {
        let config = DemoConfig {
            min_height: 10.0,
            max_height: -10.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
