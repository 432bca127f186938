//! Procedural locomotion for multi-legged robots.
//!
//! The controller is driven once per fixed tick with a ground target and a
//! look-at cursor:
//!
//! 1. **Body filters** smooth the commanded position and heading with
//!    [`SecondOrderFilter`]s.
//! 2. **Gait** keeps each foot planted until it trails its desired placement
//!    by more than a stride, then swings it; the two index-parity groups
//!    alternate so one group always supports the body.
//! 3. **Leg IK** yaws each hip toward its foot and solves the two links in
//!    the vertical plane.
//!
//! Output is a [`ControllerOutput`] that can be written into any
//! [`Scene`](strider_core::traits::Scene) or, with the `bevy` feature, into
//! entity transforms by [`StriderGaitPlugin`].

pub mod controller;
pub mod filter;
pub mod gait;
#[cfg(feature = "bevy")]
pub mod plugin;
pub mod pose;
pub mod swing;
pub mod types;

pub use controller::{LocomotionController, tilt_rotation, yaw_correction, yaw_rotation};
pub use filter::{FilterParams, FilterValue, SecondOrderFilter};
pub use gait::{LegGaitState, LegStep, SwingDrive, opposite_group_grounded, parity, step_leg};
#[cfg(feature = "bevy")]
pub use plugin::{
    HipJoint, KneeJoint, Locomotion, LocomotionInput, RobotBody, StriderGaitPlugin, spawn_robot,
};
pub use pose::{BodyPose, ControllerOutput, LegNodes, LegPose, RobotRig};
pub use swing::{remaining_fraction, step_height, swing_speed};
pub use types::{ControllerConfig, GaitConfig, LegConfig, TiltConfig};
