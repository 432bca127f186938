//! Second-order dynamics filter.
//!
//! Models the output as a mass-spring-damper driven by the input:
//!
//! ```text
//! k2·y'' + k1·y' + y = x + k3·x'
//! k1 = z / (π f)      k2 = 1 / (2π f)²      k3 = r z / (2π f)
//! ```
//!
//! `f` is the natural frequency (Hz), `z` the damping ratio and `r` the
//! initial response (negative values anticipate, values above one overshoot).
//! Integration is semi-implicit Euler; steps longer than the critical step
//! are split into equal sub-steps so the filter stays stable for any `dt`.

use std::f64::consts::PI;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};
use strider_core::error::ConfigError;
use tracing::warn;

/// Values a [`SecondOrderFilter`] can track: scalars and vectors over `f64`.
pub trait FilterValue:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> + Div<f64, Output = Self>
{
}

impl<T> FilterValue for T where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T> + Div<f64, Output = T>
{
}

/// Tuning of a second-order filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Natural frequency in Hz. Must be positive.
    pub f: f64,
    /// Damping ratio. Zero never settles, one is critically damped.
    pub z: f64,
    /// Initial response factor.
    pub r: f64,
}

impl FilterParams {
    pub const fn new(f: f64, z: f64, r: f64) -> Self {
        Self { f, z, r }
    }

    /// Validate tuning. `f` must be positive; all values finite; `z` non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.f > 0.0 && self.f.is_finite()) {
            return Err(ConfigError::InvalidFrequency(self.f));
        }
        if !(self.z >= 0.0 && self.z.is_finite()) {
            return Err(ConfigError::invalid("z", format!("{} must be finite and >= 0", self.z)));
        }
        if !self.r.is_finite() {
            return Err(ConfigError::invalid("r", "must be finite"));
        }
        Ok(())
    }
}

/// Second-order low-pass filter over a scalar or vector signal.
#[derive(Debug, Clone)]
pub struct SecondOrderFilter<T> {
    k1: f64,
    k2: f64,
    k3: f64,
    dt_crit: f64,
    prev_input: T,
    y: T,
    yd: Option<T>,
}

impl<T: FilterValue> SecondOrderFilter<T> {
    /// Build a filter resting at `x0`.
    pub fn new(params: FilterParams, x0: T) -> Result<Self, ConfigError> {
        params.validate()?;
        let FilterParams { f, z, r } = params;
        let k1 = z / (PI * f);
        let k2 = 1.0 / ((2.0 * PI * f) * (2.0 * PI * f));
        let k3 = r * z / (2.0 * PI * f);
        let dt_crit = 0.8 * ((4.0 * k2 + k1 * k1).sqrt() - k1);
        Ok(Self {
            k1,
            k2,
            k3,
            dt_crit,
            prev_input: x0,
            y: x0,
            yd: None,
        })
    }

    /// Advance by `dt` seconds toward input `x`.
    ///
    /// A non-positive or non-finite `dt` is ignored.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn update(&mut self, dt: f64, x: T) {
        if !(dt > 0.0 && dt.is_finite()) {
            warn!(dt, "second-order filter ignored a non-positive timestep");
            return;
        }

        let xd = (x - self.prev_input) / dt;
        self.prev_input = x;
        let mut yd = self.yd.unwrap_or(xd);

        let iterations = (dt / self.dt_crit).ceil().max(1.0) as u32;
        let h = dt / f64::from(iterations);
        for _ in 0..iterations {
            self.y = self.y + yd * h;
            yd = yd + (x + xd * self.k3 - self.y - yd * self.k1) * (h / self.k2);
        }
        self.yd = Some(yd);
    }

    /// Current output.
    pub const fn y(&self) -> T {
        self.y
    }

    /// Current output velocity; `None` before the first update.
    pub const fn yd(&self) -> Option<T> {
        self.yd
    }

    /// Overwrite the output velocity (an impulse on the filtered system).
    pub const fn set_yd(&mut self, yd: T) {
        self.yd = Some(yd);
    }

    /// Put the filter back at rest on `x0`.
    pub const fn reset(&mut self, x0: T) {
        self.prev_input = x0;
        self.y = x0;
        self.yd = None;
    }

    /// Largest sub-step the integrator takes (seconds).
    pub const fn critical_dt(&self) -> f64 {
        self.dt_crit
    }

    /// Derived coefficients `(k1, k2, k3)`.
    pub const fn coefficients(&self) -> (f64, f64, f64) {
        (self.k1, self.k2, self.k3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn coefficients_follow_tuning() {
        let filter = SecondOrderFilter::new(FilterParams::new(2.0, 0.5, 1.5), 0.0).unwrap();
        let (k1, k2, k3) = filter.coefficients();
        assert_relative_eq!(k1, 0.5 / (PI * 2.0));
        assert_relative_eq!(k2, 1.0 / (4.0 * PI).powi(2));
        assert_relative_eq!(k3, 1.5 * 0.5 / (4.0 * PI));
        assert_relative_eq!(
            filter.critical_dt(),
            0.8 * ((4.0 * k2 + k1 * k1).sqrt() - k1)
        );
    }

    #[test]
    fn rejects_non_positive_frequency() {
        assert!(matches!(
            SecondOrderFilter::new(FilterParams::new(0.0, 1.0, 0.0), 0.0),
            Err(ConfigError::InvalidFrequency(_))
        ));
        assert!(SecondOrderFilter::new(FilterParams::new(-1.0, 1.0, 0.0), 0.0).is_err());
        assert!(SecondOrderFilter::new(FilterParams::new(1.0, -0.1, 0.0), 0.0).is_err());
        assert!(SecondOrderFilter::new(FilterParams::new(1.0, 1.0, f64::NAN), 0.0).is_err());
    }

    #[test]
    fn first_update_seeds_velocity_from_input() {
        let mut filter = SecondOrderFilter::new(FilterParams::new(1.0, 1.0, 0.0), 0.0).unwrap();
        assert!(filter.yd().is_none());
        filter.update(0.01, 0.0);
        assert_relative_eq!(filter.yd().unwrap(), 0.0);
        assert_relative_eq!(filter.y(), 0.0);
    }

    #[test]
    fn vector_filter_converges() {
        // At 0.3 Hz the first-tick velocity estimate of 62.5 m/s rings for a
        // few seconds; 1000 ticks of 16 ms comfortably settle it.
        let params = FilterParams::new(0.3, 0.5, 0.5);
        let mut filter = SecondOrderFilter::new(params, Vector3::zeros()).unwrap();
        let target = Vector3::new(1.0, 0.0, 0.0);
        for _ in 0..1000 {
            filter.update(0.016, target);
        }
        assert_relative_eq!(filter.y(), target, epsilon = 1e-3);
        assert!(filter.yd().unwrap().norm() < 1e-3);
    }

    #[test]
    fn converges_with_steps_far_above_critical() {
        let mut filter = SecondOrderFilter::new(FilterParams::new(3.0, 0.4, 2.0), 0.0).unwrap();
        let dt = filter.critical_dt() * 25.0;
        for _ in 0..400 {
            filter.update(dt, -2.0);
        }
        assert_relative_eq!(filter.y(), -2.0, epsilon = 1e-6);
        assert_relative_eq!(filter.yd().unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn chunking_does_not_change_trajectory() {
        let params = FilterParams::new(1.0, 1.0, 0.0);
        let mut whole = SecondOrderFilter::new(params, 0.0).unwrap();
        let mut split = SecondOrderFilter::new(params, 0.0).unwrap();
        whole.update(0.1, 0.0);
        split.update(0.1, 0.0);

        // dt_crit ≈ 0.105 here, so one 1.0 s step runs ten 0.1 s sub-steps.
        whole.update(1.0, 1.0);
        for _ in 0..10 {
            split.update(0.1, 1.0);
        }
        assert_relative_eq!(whole.y(), split.y(), epsilon = 1e-9);
        assert_relative_eq!(whole.yd().unwrap(), split.yd().unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn chunking_is_close_with_feed_forward() {
        let params = FilterParams::new(0.8, 0.7, 0.5);
        let mut whole = SecondOrderFilter::new(params, 0.0).unwrap();
        let mut split = SecondOrderFilter::new(params, 0.0).unwrap();
        whole.update(0.02, 0.0);
        split.update(0.02, 0.0);

        whole.update(0.4, 1.0);
        for _ in 0..4 {
            split.update(0.1, 1.0);
        }
        // Let both settle on the same input and compare where they end up.
        for _ in 0..200 {
            whole.update(0.02, 1.0);
            split.update(0.02, 1.0);
        }
        assert_relative_eq!(whole.y(), split.y(), epsilon = 1e-4);
    }

    #[test]
    fn ignores_degenerate_timestep() {
        let mut filter = SecondOrderFilter::new(FilterParams::new(1.0, 1.0, 0.0), 5.0).unwrap();
        filter.update(0.0, 10.0);
        filter.update(-0.1, 10.0);
        filter.update(f64::NAN, 10.0);
        assert_relative_eq!(filter.y(), 5.0);
        assert!(filter.yd().is_none());
    }

    #[test]
    fn velocity_impulse_decays() {
        let mut filter = SecondOrderFilter::new(FilterParams::new(1.0, 0.2, 1.0), 0.0).unwrap();
        filter.update(0.01, 0.0);
        filter.set_yd(3.0);
        filter.update(0.01, 0.0);
        assert!(filter.y() > 0.0);
        for _ in 0..2000 {
            filter.update(0.01, 0.0);
        }
        assert_relative_eq!(filter.y(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn reset_returns_to_rest() {
        let mut filter = SecondOrderFilter::new(FilterParams::new(1.0, 1.0, 0.0), 0.0).unwrap();
        filter.update(0.05, 3.0);
        filter.reset(1.0);
        assert_relative_eq!(filter.y(), 1.0);
        assert!(filter.yd().is_none());
    }
}
