//! Controller configuration.
//!
//! Everything the controller needs is passed in as plain values; the TOML
//! loaders exist for hosts that keep tuning on disk.

use std::f64::consts::PI;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use strider_core::error::ConfigError;

use crate::filter::FilterParams;

const fn default_position_filter() -> FilterParams {
    FilterParams::new(0.6, 0.8, 0.0)
}
const fn default_yaw_filter() -> FilterParams {
    FilterParams::new(1.0, 1.0, 0.0)
}
const fn default_body_height() -> f64 {
    0.8
}
fn default_legs() -> Vec<LegConfig> {
    ControllerConfig::quadruped_legs()
}

const fn default_stride_boundary() -> f64 {
    0.6
}
const fn default_step_speed() -> f64 {
    3.0
}
const fn default_step_height_scale() -> f64 {
    0.6
}
const fn default_min_step_speed() -> f64 {
    0.3
}
const fn default_velocity_bias_gain() -> f64 {
    0.1
}
const fn default_max_velocity_bias() -> f64 {
    1.0
}

const fn default_tilt_gain() -> f64 {
    0.08
}
const fn default_max_tilt() -> f64 {
    0.25
}

fn check_finite_vec(field: &str, v: &Vector3<f64>) -> Result<(), ConfigError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "all components must be finite"))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be finite and >= 0")))
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be finite and > 0")))
    }
}

// ---------------------------------------------------------------------------
// LegConfig
// ---------------------------------------------------------------------------

/// Static geometry of one leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegConfig {
    /// Hip attach point in the body frame.
    pub hip_offset: Vector3<f64>,
    /// Rest foot placement relative to the body's ground point, before yaw.
    pub stance_offset: Vector3<f64>,
    /// Hip-to-knee link length.
    pub upper_length: f64,
    /// Knee-to-foot link length.
    pub lower_length: f64,
}

impl LegConfig {
    pub const fn new(
        hip_offset: Vector3<f64>,
        stance_offset: Vector3<f64>,
        upper_length: f64,
        lower_length: f64,
    ) -> Self {
        Self {
            hip_offset,
            stance_offset,
            upper_length,
            lower_length,
        }
    }

    /// Distance from the body origin to the stance point, the lever arm for yaw.
    pub fn stance_radius(&self) -> f64 {
        self.stance_offset.norm()
    }

    /// Validate leg `index`.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        for length in [self.upper_length, self.lower_length] {
            if !(length > 0.0 && length.is_finite()) {
                return Err(ConfigError::InvalidLinkLength { leg: index, length });
            }
        }
        check_finite_vec("hip_offset", &self.hip_offset)?;
        check_finite_vec("stance_offset", &self.stance_offset)
    }
}

// ---------------------------------------------------------------------------
// GaitConfig
// ---------------------------------------------------------------------------

/// Stepping behavior shared by every leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Distance a planted foot may trail its target before it steps (default: 0.6).
    #[serde(default = "default_stride_boundary")]
    pub stride_boundary: f64,

    /// Swing speed as a multiple of the body speed (default: 3.0).
    #[serde(default = "default_step_speed")]
    pub step_speed: f64,

    /// Swing height scale; peak lift is half of this (default: 0.6).
    #[serde(default = "default_step_height_scale")]
    pub step_height_scale: f64,

    /// Body speed floor used when driving a swing (default: 0.3).
    #[serde(default = "default_min_step_speed")]
    pub min_step_speed: f64,

    /// Foot target lead per unit of body speed (default: 0.1).
    #[serde(default = "default_velocity_bias_gain")]
    pub velocity_bias_gain: f64,

    /// Cap on the foot target lead (default: 1.0).
    #[serde(default = "default_max_velocity_bias")]
    pub max_velocity_bias: f64,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            stride_boundary: default_stride_boundary(),
            step_speed: default_step_speed(),
            step_height_scale: default_step_height_scale(),
            min_step_speed: default_min_step_speed(),
            velocity_bias_gain: default_velocity_bias_gain(),
            max_velocity_bias: default_max_velocity_bias(),
        }
    }
}

impl GaitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("gait.stride_boundary", self.stride_boundary)?;
        check_positive("gait.step_speed", self.step_speed)?;
        check_non_negative("gait.step_height_scale", self.step_height_scale)?;
        check_positive("gait.min_step_speed", self.min_step_speed)?;
        check_non_negative("gait.velocity_bias_gain", self.velocity_bias_gain)?;
        check_non_negative("gait.max_velocity_bias", self.max_velocity_bias)
    }

    /// Lead applied to foot targets at body speed `speed`.
    pub fn velocity_bias(&self, speed: f64) -> f64 {
        (speed * self.velocity_bias_gain).min(self.max_velocity_bias)
    }
}

// ---------------------------------------------------------------------------
// TiltConfig
// ---------------------------------------------------------------------------

/// Cosmetic body lean into the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltConfig {
    /// Lean angle per unit of body speed, rad/(m/s) (default: 0.08).
    #[serde(default = "default_tilt_gain")]
    pub gain: f64,

    /// Maximum lean angle in radians (default: 0.25).
    #[serde(default = "default_max_tilt")]
    pub max_angle: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            gain: default_tilt_gain(),
            max_angle: default_max_tilt(),
        }
    }
}

impl TiltConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("tilt.gain", self.gain)?;
        check_non_negative("tilt.max_angle", self.max_angle)?;
        if self.max_angle >= PI / 2.0 {
            return Err(ConfigError::invalid("tilt.max_angle", "must be below pi/2"));
        }
        Ok(())
    }

    /// Lean angle at body speed `speed`.
    pub fn angle(&self, speed: f64) -> f64 {
        (speed * self.gain).min(self.max_angle)
    }
}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Complete locomotion controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Body position filter tuning.
    #[serde(default = "default_position_filter")]
    pub position_filter: FilterParams,

    /// Body yaw filter tuning.
    #[serde(default = "default_yaw_filter")]
    pub yaw_filter: FilterParams,

    #[serde(default)]
    pub gait: GaitConfig,

    #[serde(default)]
    pub tilt: TiltConfig,

    /// Height of the body frame above its ground point (default: 0.8).
    #[serde(default = "default_body_height")]
    pub body_height: f64,

    /// Legs in circular order around the body. Even and odd indices form the
    /// two groups that alternate stepping.
    #[serde(default = "default_legs")]
    pub legs: Vec<LegConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::quadruped()
    }
}

impl ControllerConfig {
    /// Four legs at the body corners: front-left, front-right, rear-right,
    /// rear-left. The parity groups are the two diagonals.
    pub fn quadruped() -> Self {
        Self {
            position_filter: default_position_filter(),
            yaw_filter: default_yaw_filter(),
            gait: GaitConfig::default(),
            tilt: TiltConfig::default(),
            body_height: default_body_height(),
            legs: Self::quadruped_legs(),
        }
    }

    /// Six legs evenly spaced around the body. The parity groups are the two
    /// alternating tripods.
    pub fn hexapod() -> Self {
        let legs = (0..6_u32)
            .map(|k| {
                let angle = PI / 6.0 + f64::from(k) * PI / 3.0;
                let dir = Vector3::new(angle.cos(), 0.0, -angle.sin());
                LegConfig::new(dir * 0.5, dir * 1.4, 1.0, 1.3)
            })
            .collect();
        Self {
            legs,
            ..Self::quadruped()
        }
    }

    fn quadruped_legs() -> Vec<LegConfig> {
        // Forward is +X, left is -Z.
        [(1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0)]
            .into_iter()
            .map(|(x, z)| {
                LegConfig::new(
                    Vector3::new(0.4 * x, 0.0, 0.4 * z),
                    Vector3::new(1.1 * x, 0.0, 1.1 * z),
                    1.0,
                    1.3,
                )
            })
            .collect()
    }

    /// Validate every section. Returns the first error found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.position_filter.validate()?;
        self.yaw_filter.validate()?;
        self.gait.validate()?;
        self.tilt.validate()?;
        if !self.body_height.is_finite() {
            return Err(ConfigError::invalid("body_height", "must be finite"));
        }
        if self.legs.is_empty() {
            return Err(ConfigError::NoLegs);
        }
        for (index, leg) in self.legs.iter().enumerate() {
            leg.validate(index)?;
        }
        Ok(())
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn presets_are_valid() {
        assert!(ControllerConfig::quadruped().validate().is_ok());
        assert!(ControllerConfig::hexapod().validate().is_ok());
        assert_eq!(ControllerConfig::hexapod().legs.len(), 6);
    }

    #[test]
    fn quadruped_parity_groups_are_diagonals() {
        let legs = ControllerConfig::quadruped().legs;
        for i in 0..2 {
            let a = legs[i].stance_offset;
            let b = legs[i + 2].stance_offset;
            assert_relative_eq!(a, -b);
        }
    }

    #[test]
    fn empty_legs_rejected() {
        let config = ControllerConfig {
            legs: Vec::new(),
            ..ControllerConfig::quadruped()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoLegs)));
    }

    #[test]
    fn bad_link_reports_leg() {
        let mut config = ControllerConfig::quadruped();
        config.legs[2].lower_length = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLinkLength { leg: 2, .. })
        ));
    }

    #[test]
    fn bad_filter_rejected() {
        let config = ControllerConfig {
            yaw_filter: FilterParams::new(0.0, 1.0, 0.0),
            ..ControllerConfig::quadruped()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFrequency(_))));
    }

    #[test]
    fn bad_gait_rejected() {
        let mut config = ControllerConfig::quadruped();
        config.gait.step_speed = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r"
            body_height = 1.0

            [gait]
            stride_boundary = 0.4

            [[legs]]
            hip_offset = [0.3, 0.0, 0.0]
            stance_offset = [1.0, 0.0, 0.0]
            upper_length = 0.7
            lower_length = 0.9

            [[legs]]
            hip_offset = [-0.3, 0.0, 0.0]
            stance_offset = [-1.0, 0.0, 0.0]
            upper_length = 0.7
            lower_length = 0.9
        ";
        let config = ControllerConfig::from_toml_str(toml).unwrap();
        assert_relative_eq!(config.body_height, 1.0);
        assert_relative_eq!(config.gait.stride_boundary, 0.4);
        assert_relative_eq!(config.gait.step_speed, 3.0);
        assert_eq!(config.legs.len(), 2);
        assert_relative_eq!(config.legs[1].stance_offset.x, -1.0);
        assert_eq!(config.position_filter, default_position_filter());
    }

    #[test]
    fn empty_toml_is_quadruped() {
        let config = ControllerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ControllerConfig::quadruped());
    }

    #[test]
    fn bias_and_tilt_are_capped() {
        let gait = GaitConfig::default();
        assert_relative_eq!(gait.velocity_bias(2.0), 0.2);
        assert_relative_eq!(gait.velocity_bias(50.0), 1.0);
        let tilt = TiltConfig::default();
        assert_relative_eq!(tilt.angle(1.0), 0.08);
        assert_relative_eq!(tilt.angle(100.0), 0.25);
    }

    #[test]
    fn stance_radius_is_offset_length() {
        let flat = LegConfig::new(Vector3::zeros(), Vector3::new(3.0, 0.0, 4.0), 1.0, 1.0);
        assert_relative_eq!(flat.stance_radius(), 5.0);

        // A raised or lowered stance point counts toward the lever arm.
        let raised = LegConfig::new(Vector3::zeros(), Vector3::new(2.0, 3.0, 6.0), 1.0, 1.0);
        assert_relative_eq!(raised.stance_radius(), 7.0);
    }
}
