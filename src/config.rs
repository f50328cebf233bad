//! Engine configuration, loaded from JSON.
//!
//! Every field has a default, so a partial document such as
//! `{"model": {"insolation_model": "selsis"}}` is valid.

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

/// Habitable-zone threshold model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsolationModel {
    /// Kopparapu et al. 2013 effective-flux polynomials.
    #[default]
    Kopparapu,
    /// Selsis et al. 2007 cloud-cover limits.
    Selsis,
}

/// Which habitable-zone limits the validator checks planets against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitableZoneFlavor {
    Conservative,
    #[default]
    Optimistic,
}

/// Parameters that change formula outputs. Owned by the hierarchy, so
/// replacing it invalidates cached values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub insolation_model: InsolationModel,
    /// Tidal dissipation quality factor Q.
    pub tidal_quality_factor: f64,
    /// Delay between stellar and planetary formation, in Gyr.
    pub planet_formation_delay_gyr: f64,
    /// Initial spin period of a body before tidal braking, in hours.
    pub initial_spin_period_hours: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            insolation_model: InsolationModel::Kopparapu,
            tidal_quality_factor: 500.0,
            planet_formation_delay_gyr: 0.1,
            initial_spin_period_hours: 13.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub habitable_zone: HabitableZoneFlavor,
    /// Stars living shorter than this (Gyr) are flagged as hostile to life.
    pub minimum_stellar_lifetime_gyr: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { habitable_zone: HabitableZoneFlavor::Optimistic, minimum_stellar_lifetime_gyr: 1.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub validation: ValidationConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, message: format!("must be positive, got {}", value) })
            }
        };
        positive("model.tidal_quality_factor", self.model.tidal_quality_factor)?;
        positive("model.initial_spin_period_hours", self.model.initial_spin_period_hours)?;
        if !(self.model.planet_formation_delay_gyr >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "model.planet_formation_delay_gyr",
                message: format!("must not be negative, got {}", self.model.planet_formation_delay_gyr),
            });
        }
        positive("validation.minimum_stellar_lifetime_gyr", self.validation.minimum_stellar_lifetime_gyr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.model.tidal_quality_factor, 500.0);
    }

    #[test]
    fn test_partial_document_overrides_fields() {
        let config = EngineConfig::from_json_str(
            r#"{"model": {"insolation_model": "selsis"}, "validation": {"habitable_zone": "conservative"}}"#,
        )
        .unwrap();
        assert_eq!(config.model.insolation_model, InsolationModel::Selsis);
        assert_eq!(config.model.planet_formation_delay_gyr, 0.1);
        assert_eq!(config.validation.habitable_zone, HabitableZoneFlavor::Conservative);
    }

    #[rstest]
    #[case(r#"{"model": {"tidal_quality_factor": 0}}"#, "model.tidal_quality_factor")]
    #[case(r#"{"model": {"planet_formation_delay_gyr": -1}}"#, "model.planet_formation_delay_gyr")]
    #[case(r#"{"validation": {"minimum_stellar_lifetime_gyr": -2}}"#, "validation.minimum_stellar_lifetime_gyr")]
    fn test_invalid_values_rejected(#[case] json: &str, #[case] expected_field: &str) {
        match EngineConfig::from_json_str(json) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("Expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"model": {{"tidal_quality_factor": 100}}}}"#).unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.model.tidal_quality_factor, 100.0);
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(EngineConfig::from_json_str("{model"), Err(ConfigError::Parse(_))));
        assert!(matches!(EngineConfig::from_path("/nonexistent/engine.json"), Err(ConfigError::Io(_))));
    }
}
