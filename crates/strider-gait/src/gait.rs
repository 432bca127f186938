//! Distance-triggered alternating gait.
//!
//! Each leg keeps its foot planted until the body has carried the desired
//! foot placement more than a stride away. Legs are split into two groups by
//! index parity; a leg may only lift while every leg of the other group is
//! planted, so one full group always supports the body.

use nalgebra::Vector3;
use tracing::debug;

use crate::swing::{remaining_fraction, step_height, swing_speed};
use crate::types::GaitConfig;

/// Stepping state of one leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegGaitState {
    grounded: bool,
    current_foot: Vector3<f64>,
    target_foot: Vector3<f64>,
    liftoff_distance: f64,
}

impl LegGaitState {
    /// A leg planted at `foot`.
    pub const fn planted(foot: Vector3<f64>) -> Self {
        Self {
            grounded: true,
            current_foot: foot,
            target_foot: foot,
            liftoff_distance: 0.0,
        }
    }

    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub const fn is_swinging(&self) -> bool {
        !self.grounded
    }

    /// Foot position on the ground plane, without swing lift.
    pub const fn current_foot(&self) -> Vector3<f64> {
        self.current_foot
    }

    /// Landing point of the current (or last) swing.
    pub const fn target_foot(&self) -> Vector3<f64> {
        self.target_foot
    }

    /// Distance to the landing point recorded at lift-off.
    pub const fn liftoff_distance(&self) -> f64 {
        self.liftoff_distance
    }

    /// Swing progress in `[0, 1]`; `1` while planted.
    pub fn swing_progress(&self) -> f64 {
        if self.grounded {
            return 1.0;
        }
        let remaining = (self.target_foot - self.current_foot).norm();
        1.0 - remaining_fraction(remaining, self.liftoff_distance)
    }

    fn lift_off(&mut self, target: Vector3<f64>, distance: f64) {
        self.grounded = false;
        self.target_foot = target;
        self.liftoff_distance = distance;
    }
}

/// Parity group of leg `index`.
pub const fn parity(index: usize) -> usize {
    index % 2
}

/// Whether every leg in the group opposite to `leg` is planted.
pub fn opposite_group_grounded(states: &[LegGaitState], leg: usize) -> bool {
    states
        .iter()
        .enumerate()
        .filter(|(j, _)| parity(*j) != parity(leg))
        .all(|(_, state)| state.grounded)
}

/// Per-tick body motion that drives swinging feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingDrive {
    pub dt: f64,
    /// Linear body speed.
    pub body_speed: f64,
    /// Body yaw rate (rad/s).
    pub yaw_rate: f64,
}

/// What happened to one leg during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegStep {
    /// Foot position including swing lift.
    pub foot: Vector3<f64>,
    /// Vertical lift added to the ground foot position.
    pub lift: f64,
    pub lifted_off: bool,
    pub touched_down: bool,
}

/// Advance leg `leg` by one tick toward `desired`.
///
/// Reads the grounded flags of all legs as they stand, so legs earlier in the
/// same tick have already been updated. Callers must visit legs in a fixed
/// order for the result to be reproducible.
pub fn step_leg(
    states: &mut [LegGaitState],
    leg: usize,
    desired: Vector3<f64>,
    stance_radius: f64,
    gait: &GaitConfig,
    drive: &SwingDrive,
) -> LegStep {
    let mut lifted_off = false;
    let mut touched_down = false;

    if states[leg].grounded {
        let dist = (desired - states[leg].current_foot).norm();
        if dist > gait.stride_boundary && opposite_group_grounded(states, leg) {
            states[leg].lift_off(desired, dist);
            lifted_off = true;
            debug!(leg, distance = dist, "leg lifted off");
        }
    }

    let state = &mut states[leg];
    let mut lift = 0.0;
    if !state.grounded {
        let rem = state.target_foot - state.current_foot;
        let rem_dist = rem.norm();
        let speed = swing_speed(drive.body_speed, drive.yaw_rate, stance_radius, gait.min_step_speed);
        let step = gait.step_speed * speed * drive.dt.max(0.0);

        lift = step_height(
            remaining_fraction(rem_dist, state.liftoff_distance),
            gait.step_height_scale,
        );

        if step >= rem_dist {
            state.current_foot = state.target_foot;
            state.grounded = true;
            lift = 0.0;
            touched_down = true;
            debug!(leg, "leg touched down");
        } else {
            state.current_foot += rem * (step / rem_dist);
        }
    }

    LegStep {
        foot: state.current_foot + Vector3::y() * lift,
        lift,
        lifted_off,
        touched_down,
    }
}
