//! Gait statistics tracking.
//!
//! [`GaitStats`] counts ticks, lift-offs and touchdowns by watching each
//! leg's grounded flag change between consecutive controller outputs.

use bevy::prelude::*;
use strider_gait::{ControllerOutput, Locomotion};

// ---------------------------------------------------------------------------
// GaitStats
// ---------------------------------------------------------------------------

/// Bevy resource that tracks cumulative stepping statistics.
#[derive(Resource, Clone, Debug, Default, PartialEq, Eq)]
pub struct GaitStats {
    /// Controller outputs recorded.
    pub ticks: u64,
    /// Grounded-to-swinging transitions across all legs.
    pub lift_offs: u64,
    /// Swinging-to-grounded transitions across all legs.
    pub touchdowns: u64,
    /// Most legs seen in the air on a single tick.
    pub max_swinging: usize,
    /// Grounded flag of each leg on the last recorded tick (for edge detection).
    was_grounded: Vec<bool>,
}

impl GaitStats {
    /// Create empty stats.
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            lift_offs: 0,
            touchdowns: 0,
            max_swinging: 0,
            was_grounded: Vec::new(),
        }
    }

    /// Fold in one tick of controller output.
    ///
    /// Legs first seen on this tick are compared against a planted start.
    pub fn record(&mut self, output: &ControllerOutput) {
        self.ticks += 1;
        self.was_grounded.resize(output.legs.len(), true);
        for (leg, was) in output.legs.iter().zip(self.was_grounded.iter_mut()) {
            match (*was, leg.grounded) {
                (true, false) => self.lift_offs += 1,
                (false, true) => self.touchdowns += 1,
                _ => {}
            }
            *was = leg.grounded;
        }
        self.max_swinging = self.max_swinging.max(output.swinging());
    }

    /// Legs in the air on the last recorded tick.
    pub fn swinging(&self) -> usize {
        self.was_grounded.iter().filter(|g| !**g).count()
    }

    /// Mean lift-offs per second of recorded time.
    pub fn step_rate(&self, tick_dt: f64) -> Option<f64> {
        if self.ticks == 0 || tick_dt <= 0.0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        Some(self.lift_offs as f64 / (self.ticks as f64 * tick_dt))
    }

    /// Reset all statistics.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// System that records the controller output produced this tick.
#[allow(clippy::needless_pass_by_value)]
pub fn gait_stats_system(locomotion: Option<Res<Locomotion>>, mut stats: ResMut<GaitStats>) {
    if let Some(output) = locomotion.as_ref().and_then(|l| l.output.as_ref()) {
        stats.record(output);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use strider_core::StriderSet;
    use strider_gait::{ControllerConfig, LocomotionController, LocomotionInput, StriderGaitPlugin};

    fn output(grounded: &[bool]) -> ControllerOutput {
        let mut controller = LocomotionController::new(ControllerConfig::quadruped()).unwrap();
        let mut out = controller.step(0.01, Vector3::zeros(), Vector3::x());
        for (leg, g) in out.legs.iter_mut().zip(grounded) {
            leg.grounded = *g;
        }
        out
    }

    #[test]
    fn counts_transitions() {
        let mut stats = GaitStats::new();
        stats.record(&output(&[true, true, true, true]));
        stats.record(&output(&[false, true, false, true]));
        stats.record(&output(&[false, true, false, true]));
        stats.record(&output(&[true, false, true, true]));

        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.lift_offs, 3);
        assert_eq!(stats.touchdowns, 2);
        assert_eq!(stats.max_swinging, 2);
        assert_eq!(stats.swinging(), 1);
    }

    #[test]
    fn step_rate_needs_ticks() {
        let mut stats = GaitStats::new();
        assert!(stats.step_rate(0.01).is_none());
        stats.record(&output(&[false, true, true, true]));
        assert!((stats.step_rate(0.5).unwrap() - 2.0).abs() < 1e-12);
        stats.reset();
        assert_eq!(stats, GaitStats::new());
    }

    #[test]
    fn system_records_walking_robot() {
        let mut app = App::new();
        app.add_plugins((strider_core::StriderCorePlugin, StriderGaitPlugin));
        app.init_resource::<GaitStats>();
        app.add_systems(Update, gait_stats_system.in_set(StriderSet::Emit));
        let controller = LocomotionController::new(ControllerConfig::quadruped()).unwrap();
        app.insert_resource(Locomotion::new(controller));
        app.finish();
        app.cleanup();

        app.world_mut().resource_mut::<LocomotionInput>().target = Vector3::new(3.0, 0.0, 0.0);
        app.world_mut().resource_mut::<LocomotionInput>().cursor = Vector3::new(10.0, 0.0, 0.0);
        for _ in 0..300 {
            app.update();
        }

        let stats = app.world().resource::<GaitStats>();
        assert_eq!(stats.ticks, 300);
        assert!(stats.lift_offs > 0);
        assert!(stats.max_swinging <= 2);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn stats_is_send_sync() {
        assert_send_sync::<GaitStats>();
    }
}
