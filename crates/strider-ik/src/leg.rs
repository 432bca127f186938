//! Three-dimensional leg solving on top of the planar two-link solver.
//!
//! A leg is attached to the body at a hip point. The hip first yaws about
//! the body's vertical axis to face the foot, then the two links solve the
//! remaining problem in the vertical plane through hip and foot.

use nalgebra::{UnitQuaternion, Vector3};
use strider_core::error::ConfigError;

use crate::two_link::{IkBranch, TwoLinkSolver};

/// Solved joint configuration of one leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegJoints {
    /// Hip yaw about the body's vertical axis (radians).
    pub pivot: f64,
    /// Upper link angle in the leg plane (radians).
    pub theta1: f64,
    /// Knee angle relative to the upper link (radians).
    pub theta2: f64,
    /// Branch the planar solver took.
    pub branch: IkBranch,
}

impl LegJoints {
    /// Hip rotation: yaw by `pivot`, then raise by `theta1` about the hip's Z axis.
    pub fn hip_rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.pivot)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.theta1)
    }

    /// Knee rotation about the knee's Z axis.
    pub fn knee_rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.theta2)
    }
}

/// Leg solver: a hip attach point in the body frame plus two links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegSolver {
    hip_offset: Vector3<f64>,
    links: TwoLinkSolver,
}

impl LegSolver {
    /// Create a leg solver for leg index `leg` (used in error reports).
    pub fn new(leg: usize, hip_offset: Vector3<f64>, l1: f64, l2: f64) -> Result<Self, ConfigError> {
        let links = TwoLinkSolver::new(l1, l2).map_err(|err| match err {
            ConfigError::InvalidLinkLength { length, .. } => {
                ConfigError::InvalidLinkLength { leg, length }
            }
            other => other,
        })?;
        Ok(Self { hip_offset, links })
    }

    /// Hip attach point in the body frame.
    pub const fn hip_offset(&self) -> Vector3<f64> {
        self.hip_offset
    }

    /// The planar two-link solver.
    pub const fn links(&self) -> &TwoLinkSolver {
        &self.links
    }

    /// Solve for a foot position expressed in the body frame.
    pub fn solve(&self, foot_in_body: &Vector3<f64>) -> LegJoints {
        let local = foot_in_body - self.hip_offset;
        let reach = local.x.hypot(local.z);
        let pivot = (-local.z).atan2(local.x);
        let angles = self.links.solve(reach, local.y);
        LegJoints {
            pivot,
            theta1: angles.theta1,
            theta2: angles.theta2,
            branch: angles.branch,
        }
    }

    /// Foot position in the body frame for a joint configuration.
    pub fn forward(&self, joints: &LegJoints) -> Vector3<f64> {
        let planar = self.links.forward(joints.theta1, joints.theta2);
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), joints.pivot);
        self.hip_offset + yaw * Vector3::new(planar.x, planar.y, 0.0)
    }

    /// Knee position in the body frame for a joint configuration.
    pub fn knee(&self, joints: &LegJoints) -> Vector3<f64> {
        self.hip_offset + joints.hip_rotation() * Vector3::new(self.links.l1(), 0.0, 0.0)
    }
}
