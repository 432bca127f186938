//! Bevy ECS plugin for the locomotion controller.
//!
//! Provides [`StriderGaitPlugin`], which steps the controller once per update
//! in [`StriderSet::Control`] and writes the resulting pose into the
//! `Transform`s of the robot's entities in [`StriderSet::Emit`].

use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use strider_core::StriderSet;
use strider_core::config::SimConfig;

use crate::controller::LocomotionController;
use crate::pose::ControllerOutput;

/// Bevy plugin for the locomotion controller.
///
/// Insert a [`Locomotion`] resource and call [`spawn_robot`] to get a walking
/// robot; write [`LocomotionInput`] to steer it.
pub struct StriderGaitPlugin;

impl Plugin for StriderGaitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocomotionInput>()
            .add_systems(Update, locomotion_system.in_set(StriderSet::Control))
            .add_systems(Update, write_robot_transforms.in_set(StriderSet::Emit));
    }
}

/// Marker for the robot body entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct RobotBody;

/// Hip joint of leg `.0`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HipJoint(pub usize);

/// Knee joint of leg `.0`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KneeJoint(pub usize);

/// Commanded ground target and look-at cursor, in world coordinates.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LocomotionInput {
    pub target: Vector3<f64>,
    pub cursor: Vector3<f64>,
}

/// The controller and its most recent output.
#[derive(Resource, Debug)]
pub struct Locomotion {
    pub controller: LocomotionController,
    pub output: Option<ControllerOutput>,
}

impl Locomotion {
    pub const fn new(controller: LocomotionController) -> Self {
        Self {
            controller,
            output: None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
pub fn to_vec3(v: &Vector3<f64>) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

#[allow(clippy::cast_possible_truncation)]
pub fn to_quat(q: &UnitQuaternion<f64>) -> Quat {
    Quat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32)
}

/// Spawn the body, hip and knee entities for `controller`'s legs.
///
/// Hips hang off the body at their attach points; each knee sits one upper
/// link length along its hip's X axis. Returns the body entity.
pub fn spawn_robot(world: &mut World, controller: &LocomotionController) -> Entity {
    let body = world.spawn((RobotBody, Transform::default())).id();
    for (i, solver) in controller.solvers().iter().enumerate() {
        let hip = world
            .spawn((
                HipJoint(i),
                Transform::from_translation(to_vec3(&solver.hip_offset())),
                ChildOf(body),
            ))
            .id();
        let knee_offset = Vector3::new(solver.links().l1(), 0.0, 0.0);
        world.spawn((
            KneeJoint(i),
            Transform::from_translation(to_vec3(&knee_offset)),
            ChildOf(hip),
        ));
    }
    body
}

#[allow(clippy::needless_pass_by_value)]
fn locomotion_system(
    config: Res<SimConfig>,
    input: Res<LocomotionInput>,
    locomotion: Option<ResMut<Locomotion>>,
) {
    let Some(mut locomotion) = locomotion else {
        return;
    };
    let output = locomotion
        .controller
        .step(config.tick_dt, input.target, input.cursor);
    locomotion.output = Some(output);
}

#[allow(clippy::needless_pass_by_value, clippy::type_complexity)]
fn write_robot_transforms(
    locomotion: Option<Res<Locomotion>>,
    mut bodies: Query<&mut Transform, (With<RobotBody>, Without<HipJoint>, Without<KneeJoint>)>,
    mut hips: Query<(&HipJoint, &mut Transform), (Without<RobotBody>, Without<KneeJoint>)>,
    mut knees: Query<(&KneeJoint, &mut Transform), (Without<RobotBody>, Without<HipJoint>)>,
) {
    let Some(output) = locomotion.as_ref().and_then(|l| l.output.as_ref()) else {
        return;
    };

    for mut transform in &mut bodies {
        transform.translation = to_vec3(&output.body.position);
        transform.rotation = to_quat(&output.body.rotation);
    }
    for (hip, mut transform) in &mut hips {
        if let Some(leg) = output.legs.get(hip.0) {
            transform.rotation = to_quat(&leg.hip);
        }
    }
    for (knee, mut transform) in &mut knees {
        if let Some(leg) = output.legs.get(knee.0) {
            transform.rotation = to_quat(&leg.knee);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ControllerConfig;
    use strider_core::StriderCorePlugin;

    fn build_app() -> App {
        let mut app = App::new();
        app.add_plugins((StriderCorePlugin, StriderGaitPlugin));
        let controller = LocomotionController::new(ControllerConfig::quadruped()).unwrap();
        spawn_robot(app.world_mut(), &controller);
        app.insert_resource(Locomotion::new(controller));
        app.finish();
        app.cleanup();
        app
    }

    #[test]
    fn plugin_builds_without_controller() {
        let mut app = App::new();
        app.add_plugins((StriderCorePlugin, StriderGaitPlugin));
        app.finish();
        app.cleanup();
        app.update();
        assert!(app.world().get_resource::<LocomotionInput>().is_some());
    }

    #[test]
    fn spawns_one_hip_and_knee_per_leg() {
        let mut app = build_app();
        let world = app.world_mut();
        let hips = world.query::<&HipJoint>().iter(world).count();
        let knees = world.query::<&KneeJoint>().iter(world).count();
        assert_eq!(hips, 4);
        assert_eq!(knees, 4);
    }

    #[test]
    fn body_follows_input_target() {
        let mut app = build_app();
        app.world_mut().resource_mut::<LocomotionInput>().target = Vector3::new(2.0, 0.0, 0.0);
        app.world_mut().resource_mut::<LocomotionInput>().cursor = Vector3::new(10.0, 0.0, 0.0);
        for _ in 0..120 {
            app.update();
        }

        let world = app.world_mut();
        let body = *world
            .query_filtered::<&Transform, With<RobotBody>>()
            .single(world)
            .unwrap();
        assert!(body.translation.x > 1.0, "body at {:?}", body.translation);
        assert!((body.translation.y - 0.8).abs() < 1e-4);

        let locomotion = world.resource::<Locomotion>();
        assert!(locomotion.output.is_some());
    }

    #[test]
    fn joint_transforms_match_output() {
        let mut app = build_app();
        app.update();

        let expected = app.world().resource::<Locomotion>().output.clone().unwrap();
        let world = app.world_mut();
        let mut hips = world.query::<(&HipJoint, &Transform)>();
        for (hip, transform) in hips.iter(world) {
            let want = to_quat(&expected.legs[hip.0].hip);
            assert!(transform.rotation.angle_between(want) < 1e-5);
        }
    }

    #[test]
    fn quaternion_conversion_preserves_rotation() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.7);
        let converted = to_quat(&q);
        let v = converted * Vec3::X;
        assert!((v.x - 0.7_f32.cos()).abs() < 1e-6);
        assert!((v.z + 0.7_f32.sin()).abs() < 1e-6);
    }
}
