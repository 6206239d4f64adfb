//! Configuration for the emotional contagion pipeline.
//!
//! All values are startup-time constants. They map onto the `[contagion]`
//! table of `config.toml`; any key left out keeps its default.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [contagion]
//! cell_size = 10.0
//! grid_width = 100
//! grid_height = 100
//! contagion_radius = 10.0
//! update_interval = 0.5
//! decay_rate = 0.1
//! base_chance = 0.1
//! distance_metric = "Planar"
//! blend_fallback = "KeepTarget"
//! ```

use kinship_data::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("grid extent must be non-zero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid of {width}x{height} cells exceeds the addressable cell range")]
    GridTooLarge { width: usize, height: usize },

    #[error("blend_threshold ({blend}) must not exceed overwrite_threshold ({overwrite})")]
    ThresholdOrder { blend: f32, overwrite: f32 },

    #[error("failed to parse contagion config: {0}")]
    Parse(String),
}

/// Which axes take part in the contagion distance test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Horizontal X/Z plane only.
    #[default]
    Planar,
    /// Full X/Y/Z distance.
    Full3d,
}

impl DistanceMetric {
    #[inline]
    pub fn distance_sq(self, a: &Position, b: &Position) -> f64 {
        match self {
            DistanceMetric::Planar => a.planar_distance_sq(b),
            DistanceMetric::Full3d => a.distance_sq(b),
        }
    }
}

/// Outcome of blending two emotions with no entry in the blend table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendFallback {
    /// The target keeps its current state.
    #[default]
    KeepTarget,
    /// The target adopts the incoming emotion.
    AdoptSource,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ContagionConfig {
    /// World units per grid cell.
    pub cell_size: f64,
    /// Grid extent in cells along X.
    pub grid_width: usize,
    /// Grid extent in cells along Z.
    pub grid_height: usize,
    pub contagion_radius: f64,
    /// Seconds between pipeline runs.
    pub update_interval: f64,
    /// Intensity lost per second.
    pub decay_rate: f32,
    pub base_chance: f32,
    pub overwrite_threshold: f32,
    pub blend_threshold: f32,
    /// Intensity under which an emotion collapses back to neutral.
    pub neutral_threshold: f32,
    /// Empathy gained by an agent each time it catches an emotion.
    pub empathy_growth: f32,
    pub distance_metric: DistanceMetric,
    pub blend_fallback: BlendFallback,
    pub seed: u64,
}

impl Default for ContagionConfig {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            grid_width: 100,
            grid_height: 100,
            contagion_radius: 15.0,
            update_interval: 0.5,
            decay_rate: 0.1,
            base_chance: 0.1,
            overwrite_threshold: 0.7,
            blend_threshold: 0.3,
            neutral_threshold: 0.1,
            empathy_growth: 0.01,
            distance_metric: DistanceMetric::Planar,
            blend_fallback: BlendFallback::KeepTarget,
            seed: 0,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            field,
            value: f64::from(value),
        })
    }
}

impl ContagionConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size", self.cell_size)?;
        positive("contagion_radius", self.contagion_radius)?;
        positive("update_interval", self.update_interval)?;
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        let cells = self.grid_width.checked_mul(self.grid_height);
        if cells.map_or(true, |c| c > u32::MAX as usize) {
            return Err(ConfigError::GridTooLarge {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        non_negative("decay_rate", self.decay_rate)?;
        non_negative("base_chance", self.base_chance)?;
        non_negative("empathy_growth", self.empathy_growth)?;
        non_negative("neutral_threshold", self.neutral_threshold)?;
        non_negative("blend_threshold", self.blend_threshold)?;
        if self.blend_threshold > self.overwrite_threshold {
            return Err(ConfigError::ThresholdOrder {
                blend: self.blend_threshold,
                overwrite: self.overwrite_threshold,
            });
        }

        // The 3x3 scan only covers one ring of cells; a larger radius misses
        // pairs that sit more than one cell apart.
        if self.contagion_radius > self.cell_size {
            tracing::warn!(
                radius = self.contagion_radius,
                cell_size = self.cell_size,
                "contagion radius exceeds cell size, neighbor scan is approximate"
            );
        }
        Ok(())
    }

    #[inline]
    pub fn radius_sq(&self) -> f64 {
        self.contagion_radius * self.contagion_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ContagionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_cell_size() {
        let config = ContagionConfig {
            cell_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "cell_size",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan_interval() {
        let config = ContagionConfig {
            update_interval: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_grid() {
        let config = ContagionConfig {
            grid_height: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGrid {
                width: 100,
                height: 0
            })
        );
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = ContagionConfig {
            blend_threshold: 0.8,
            overwrite_threshold: 0.4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ContagionConfig::from_toml(
            "cell_size = 20.0\ndistance_metric = \"Full3d\"\nblend_fallback = \"AdoptSource\"",
        )
        .expect("valid toml");
        assert_eq!(config.cell_size, 20.0);
        assert_eq!(config.distance_metric, DistanceMetric::Full3d);
        assert_eq!(config.blend_fallback, BlendFallback::AdoptSource);
        assert_eq!(config.grid_width, 100);
        assert_eq!(config.decay_rate, 0.1);
    }

    #[test]
    fn test_metric_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 12.0, 4.0);
        assert_eq!(DistanceMetric::Planar.distance_sq(&a, &b), 25.0);
        assert_eq!(DistanceMetric::Full3d.distance_sq(&a, &b), 169.0);
    }
}
