use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_tick_dt() -> f64 {
    1.0 / 60.0
}
const fn default_max_ticks_per_frame() -> u32 {
    8
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Fixed-step driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct SimConfig {
    /// Controller tick length in seconds (default: 1/60).
    #[serde(default = "default_tick_dt")]
    pub tick_dt: f64,

    /// Upper bound on ticks run for a single rendered frame (default: 8).
    #[serde(default = "default_max_ticks_per_frame")]
    pub max_ticks_per_frame: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_dt: default_tick_dt(),
            max_ticks_per_frame: default_max_ticks_per_frame(),
        }
    }
}

impl SimConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_dt > 0.0 && self.tick_dt.is_finite()) {
            return Err(ConfigError::InvalidTimestep(self.tick_dt));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::invalid(
                "max_ticks_per_frame",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Tick rate in Hz.
    pub fn tick_hz(&self) -> f64 {
        1.0 / self.tick_dt
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.tick_hz() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_dt() {
        let config = SimConfig {
            tick_dt: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimestep(_))
        ));
    }

    #[test]
    fn rejects_nan_dt() {
        let config = SimConfig {
            tick_dt: f64::NAN,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_tick_cap() {
        let config = SimConfig {
            max_ticks_per_frame: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn toml_fills_defaults() {
        let config = SimConfig::from_toml_str("tick_dt = 0.01").unwrap();
        assert!((config.tick_dt - 0.01).abs() < 1e-12);
        assert_eq!(config.max_ticks_per_frame, 8);
    }

    #[test]
    fn toml_roundtrip() {
        let config = SimConfig {
            tick_dt: 0.005,
            max_ticks_per_frame: 4,
        };
        let text = toml::to_string(&config).unwrap();
        let back = SimConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn toml_invalid_reports_error() {
        let result = SimConfig::from_toml_str("tick_dt = -1.0");
        assert!(matches!(result, Err(ConfigError::InvalidTimestep(_))));

        let result = SimConfig::from_toml_str("tick_dt = \"fast\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }
}
