//! The locomotion controller: body filters, gait and leg IK in one tick.

use nalgebra::{UnitQuaternion, Vector3};
use strider_core::error::ConfigError;
use strider_ik::LegSolver;
use tracing::{info, trace};

use crate::filter::SecondOrderFilter;
use crate::gait::{LegGaitState, SwingDrive, step_leg};
use crate::pose::{BodyPose, ControllerOutput, LegPose};
use crate::types::{ControllerConfig, GaitConfig, LegConfig, TiltConfig};

const DIRECTION_EPSILON: f64 = 1e-9;

/// Rotation about +Y by `yaw`.
pub fn yaw_rotation(yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
}

/// Heading change that turns a body at `body` with heading `yaw` toward
/// `cursor`, as the arcsine of the vertical cross product.
///
/// Incremental, so the commanded yaw never wraps at ±π. Returns zero when the
/// cursor is directly above or below the body.
pub fn yaw_correction(yaw: f64, body: &Vector3<f64>, cursor: &Vector3<f64>) -> f64 {
    let forward = yaw_rotation(yaw) * Vector3::x();
    let to_cursor = Vector3::new(cursor.x - body.x, 0.0, cursor.z - body.z);
    to_cursor
        .try_normalize(DIRECTION_EPSILON)
        .map_or(0.0, |dir| forward.cross(&dir).y.clamp(-1.0, 1.0).asin())
}

/// Lean into the planar direction of `velocity`.
pub fn tilt_rotation(tilt: &TiltConfig, velocity: &Vector3<f64>) -> UnitQuaternion<f64> {
    let planar = Vector3::new(velocity.x, 0.0, velocity.z);
    let angle = tilt.angle(velocity.norm());
    Vector3::y()
        .cross(&planar)
        .try_normalize(DIRECTION_EPSILON)
        .map_or_else(UnitQuaternion::identity, |axis| {
            UnitQuaternion::from_scaled_axis(axis * angle)
        })
}

// ---------------------------------------------------------------------------
// LocomotionController
// ---------------------------------------------------------------------------

/// Procedural walking controller for a multi-legged body.
///
/// Each [`step`](Self::step) filters the body toward the commanded target,
/// turns it toward the cursor, moves feet according to the alternating gait
/// and solves every leg's joint angles. The controller owns all of its state;
/// nothing else may mutate the filters or the gait states.
#[derive(Debug, Clone)]
pub struct LocomotionController {
    position: SecondOrderFilter<Vector3<f64>>,
    yaw: SecondOrderFilter<f64>,
    gait: GaitConfig,
    tilt: TiltConfig,
    body_height: f64,
    legs: Vec<LegConfig>,
    solvers: Vec<LegSolver>,
    states: Vec<LegGaitState>,
}

impl LocomotionController {
    /// Build a controller standing at the origin facing +X.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        Self::with_pose(config, Vector3::zeros(), 0.0)
    }

    /// Build a controller standing at ground point `position` with heading `yaw`.
    ///
    /// Both filters start at rest, and every foot is planted at its stance
    /// offset around `position`.
    pub fn with_pose(
        config: ControllerConfig,
        position: Vector3<f64>,
        yaw: f64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(position.iter().all(|c| c.is_finite()) && yaw.is_finite()) {
            return Err(ConfigError::invalid("initial pose", "must be finite"));
        }

        let solvers = config
            .legs
            .iter()
            .enumerate()
            .map(|(i, leg)| LegSolver::new(i, leg.hip_offset, leg.upper_length, leg.lower_length))
            .collect::<Result<Vec<_>, _>>()?;

        let heading = yaw_rotation(yaw);
        let states = config
            .legs
            .iter()
            .map(|leg| LegGaitState::planted(position + heading * leg.stance_offset))
            .collect();

        // The robot starts at rest. Leaving the velocities unset would seed them
        // from the first command's finite difference and jump the body there.
        let mut position_filter = SecondOrderFilter::new(config.position_filter, position)?;
        position_filter.set_yd(Vector3::zeros());
        let mut yaw_filter = SecondOrderFilter::new(config.yaw_filter, yaw)?;
        yaw_filter.set_yd(0.0);

        info!(legs = config.legs.len(), "locomotion controller ready");

        Ok(Self {
            position: position_filter,
            yaw: yaw_filter,
            gait: config.gait,
            tilt: config.tilt,
            body_height: config.body_height,
            legs: config.legs,
            solvers,
            states,
        })
    }

    /// Advance one fixed tick of `dt` seconds toward ground point `target`,
    /// turning to face `cursor`.
    ///
    /// Never fails. A non-positive `dt` leaves the filters and feet where they
    /// are and re-emits the current pose.
    pub fn step(&mut self, dt: f64, target: Vector3<f64>, cursor: Vector3<f64>) -> ControllerOutput {
        let tick = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.position.update(dt, target);
        let body = self.position.y();
        let velocity = self.body_velocity();

        let commanded_yaw = self.yaw.y() + yaw_correction(self.yaw.y(), &body, &cursor);
        self.yaw.update(dt, commanded_yaw);
        let yaw = self.yaw.y();
        let heading = yaw_rotation(yaw);
        let tilt = tilt_rotation(&self.tilt, &velocity);

        let speed = velocity.norm();
        let lead = Vector3::new(velocity.x, 0.0, velocity.z)
            .try_normalize(DIRECTION_EPSILON)
            .map_or_else(Vector3::zeros, |dir| dir * self.gait.velocity_bias(speed));
        let drive = SwingDrive {
            dt: tick,
            body_speed: speed,
            yaw_rate: self.yaw_rate(),
        };

        let origin = body + Vector3::y() * self.body_height;
        let to_body = heading.inverse();
        let mut legs = Vec::with_capacity(self.states.len());

        for i in 0..self.states.len() {
            let leg = &self.legs[i];
            let desired = body + heading * leg.stance_offset + lead;
            let step = step_leg(&mut self.states, i, desired, leg.stance_radius(), &self.gait, &drive);

            let joints = self.solvers[i].solve(&(to_body * (step.foot - origin)));
            if !joints.branch.is_exact() {
                trace!(leg = i, branch = ?joints.branch, "foot outside leg reach");
            }

            legs.push(LegPose {
                hip: joints.hip_rotation(),
                knee: joints.knee_rotation(),
                foot: step.foot,
                grounded: self.states[i].is_grounded(),
                joints,
            });
        }

        ControllerOutput {
            body: BodyPose {
                position: origin,
                yaw,
                rotation: tilt * heading,
            },
            legs,
        }
    }

    /// Gait state of every leg, in index order.
    pub fn legs(&self) -> &[LegGaitState] {
        &self.states
    }

    pub fn leg_configs(&self) -> &[LegConfig] {
        &self.legs
    }

    pub fn solvers(&self) -> &[LegSolver] {
        &self.solvers
    }

    /// Filtered ground point of the body.
    pub fn body_position(&self) -> Vector3<f64> {
        self.position.y()
    }

    /// Velocity of the filtered ground point.
    pub fn body_velocity(&self) -> Vector3<f64> {
        self.position.yd().unwrap_or_else(Vector3::zeros)
    }

    /// Filtered heading (radians).
    pub fn yaw(&self) -> f64 {
        self.yaw.y()
    }

    pub fn yaw_rate(&self) -> f64 {
        self.yaw.yd().unwrap_or(0.0)
    }

    pub const fn body_height(&self) -> f64 {
        self.body_height
    }

    /// Number of legs currently swinging.
    pub fn swinging(&self) -> usize {
        self.states.iter().filter(|s| s.is_swinging()).count()
    }
}
