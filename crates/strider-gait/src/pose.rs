//! Controller output and its emission into a scene.

use nalgebra::{Matrix4, Translation3, UnitQuaternion, Vector3};
use strider_core::traits::{NodeId, Scene};
use strider_ik::LegJoints;

/// Body pose for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    /// Body frame origin: filtered ground point raised by the body height.
    pub position: Vector3<f64>,
    /// Filtered heading about +Y (radians).
    pub yaw: f64,
    /// Heading combined with the lean into the direction of travel.
    pub rotation: UnitQuaternion<f64>,
}

impl BodyPose {
    /// Homogeneous `T · R` matrix of the body.
    pub fn matrix(&self) -> Matrix4<f64> {
        Translation3::from(self.position).to_homogeneous() * self.rotation.to_homogeneous()
    }
}

/// Joint output of one leg for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegPose {
    /// Hip rotation relative to the body.
    pub hip: UnitQuaternion<f64>,
    /// Knee rotation relative to the upper link.
    pub knee: UnitQuaternion<f64>,
    /// World foot position including swing lift.
    pub foot: Vector3<f64>,
    pub grounded: bool,
    pub joints: LegJoints,
}

impl LegPose {
    pub fn hip_matrix(&self) -> Matrix4<f64> {
        self.hip.to_homogeneous()
    }

    pub fn knee_matrix(&self) -> Matrix4<f64> {
        self.knee.to_homogeneous()
    }
}

/// Everything the controller produces in one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOutput {
    pub body: BodyPose,
    pub legs: Vec<LegPose>,
}

impl ControllerOutput {
    /// Number of legs currently in the air.
    pub fn swinging(&self) -> usize {
        self.legs.iter().filter(|leg| !leg.grounded).count()
    }

    /// Write the body pose and every joint rotation into `scene`.
    ///
    /// Legs beyond the rig's leg count are skipped.
    pub fn apply_to<S: Scene + ?Sized>(&self, rig: &RobotRig, scene: &mut S) {
        scene.set_local_position(rig.body, self.body.position);
        scene.set_local_rotation(rig.body, self.body.rotation);
        for (pose, nodes) in self.legs.iter().zip(&rig.legs) {
            scene.set_local_rotation(nodes.hip, pose.hip);
            scene.set_local_rotation(nodes.knee, pose.knee);
        }
    }
}

// ---------------------------------------------------------------------------
// RobotRig
// ---------------------------------------------------------------------------

/// Scene nodes driven by one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegNodes {
    pub hip: NodeId,
    pub knee: NodeId,
}

/// Scene nodes of a robot, in controller leg order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotRig {
    pub body: NodeId,
    pub legs: Vec<LegNodes>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strider_ik::IkBranch;

    #[derive(Default)]
    struct Recorder {
        positions: Vec<(NodeId, Vector3<f64>)>,
        rotations: Vec<(NodeId, UnitQuaternion<f64>)>,
    }

    impl Scene for Recorder {
        fn set_local_position(&mut self, node: NodeId, position: Vector3<f64>) {
            self.positions.push((node, position));
        }
        fn set_local_rotation(&mut self, node: NodeId, rotation: UnitQuaternion<f64>) {
            self.rotations.push((node, rotation));
        }
    }

    fn leg_pose(angle: f64, grounded: bool) -> LegPose {
        let joints = LegJoints {
            pivot: 0.0,
            theta1: angle,
            theta2: -angle,
            branch: IkBranch::Reachable,
        };
        LegPose {
            hip: joints.hip_rotation(),
            knee: joints.knee_rotation(),
            foot: Vector3::zeros(),
            grounded,
            joints,
        }
    }

    fn output() -> ControllerOutput {
        ControllerOutput {
            body: BodyPose {
                position: Vector3::new(1.0, 0.8, -2.0),
                yaw: 0.5,
                rotation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5),
            },
            legs: vec![leg_pose(0.1, true), leg_pose(0.2, false)],
        }
    }

    #[test]
    fn apply_writes_body_and_joints() {
        let rig = RobotRig {
            body: NodeId(0),
            legs: vec![
                LegNodes { hip: NodeId(1), knee: NodeId(2) },
                LegNodes { hip: NodeId(3), knee: NodeId(4) },
            ],
        };
        let mut scene = Recorder::default();
        output().apply_to(&rig, &mut scene);

        assert_eq!(scene.positions.len(), 1);
        assert_eq!(scene.positions[0].0, NodeId(0));
        let nodes: Vec<NodeId> = scene.rotations.iter().map(|(n, _)| *n).collect();
        assert_eq!(nodes, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
    }

    #[test]
    fn short_rig_skips_extra_legs() {
        let rig = RobotRig {
            body: NodeId(0),
            legs: vec![LegNodes { hip: NodeId(1), knee: NodeId(2) }],
        };
        let mut scene = Recorder::default();
        output().apply_to(&rig, &mut scene);
        assert_eq!(scene.rotations.len(), 3);
    }

    #[test]
    fn body_matrix_places_origin() {
        let out = output();
        let m = out.body.matrix();
        assert_relative_eq!(m[(0, 3)], 1.0);
        assert_relative_eq!(m[(1, 3)], 0.8);
        assert_relative_eq!(m[(2, 3)], -2.0);
        assert_relative_eq!(m[(3, 3)], 1.0);
        assert_eq!(out.swinging(), 1);
    }

    #[test]
    fn joint_matrices_are_rotations() {
        let pose = leg_pose(0.3, true);
        let m = pose.hip_matrix();
        assert_relative_eq!(m[(0, 0)], 0.3_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(m[(1, 0)], 0.3_f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(pose.knee_matrix()[(1, 0)], (-0.3_f64).sin(), epsilon = 1e-12);
    }
}
