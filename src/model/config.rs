use anyhow::Context;
use kinship_core::ContagionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Population and placement settings for a simulated world.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// World extent along X, in world units.
    pub width: f64,
    /// World extent along Z, in world units.
    pub height: f64,
    pub initial_population: usize,
    /// Share of the initial population spawned with a non-neutral emotion.
    pub emotional_fraction: f64,
    /// Overrides `contagion.seed` and seeds population placement.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            initial_population: 500,
            emotional_fraction: 0.1,
            seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub contagion: ContagionConfig,
}

impl AppConfig {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when it is missing or unreadable.
    pub fn load() -> Self {
        match Self::load_from(DEFAULT_CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    tracing::warn!("ignoring {DEFAULT_CONFIG_PATH}: {e:#}");
                }
                Self::default()
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.world.width.is_finite() && self.world.width > 0.0,
            "world.width must be positive, got {}",
            self.world.width
        );
        anyhow::ensure!(
            self.world.height.is_finite() && self.world.height > 0.0,
            "world.height must be positive, got {}",
            self.world.height
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.world.emotional_fraction),
            "world.emotional_fraction must be within [0, 1], got {}",
            self.world.emotional_fraction
        );
        self.contagion.validate()?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::DistanceMetric;

    #[test]
    fn test_default_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.world.seed = Some(7);
        config.contagion.distance_metric = DistanceMetric::Full3d;
        let text = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            initial_population = 12

            [contagion]
            update_interval = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.world.initial_population, 12);
        assert_eq!(config.world.width, 1000.0);
        assert_eq!(config.contagion.update_interval, 1.0);
        assert_eq!(config.contagion.cell_size, 10.0);
    }

    #[test]
    fn test_invalid_contagion_section_rejected() {
        let err = AppConfig::from_toml("[contagion]\ncell_size = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("cell_size"));
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(AppConfig::load_from("/nonexistent/kinship.toml").is_err());
    }
}
