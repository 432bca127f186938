//! Input handling for driving the locomotion controller.
//!
//! This crate is input-source agnostic:
//!
//! - [`Command`]: closed set of input events, parseable from text
//! - [`InputState`]: current target, cursor and fire latch
//! - [`CommandQueue`]: resource buffering commands from any source
//! - [`cursor`]: screen-to-ground picking for mouse input
//! - [`StriderTeleopPlugin`]: applies queued commands each tick and
//!   publishes the result as [`LocomotionInput`](strider_gait::LocomotionInput)
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use strider_teleop::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(strider_core::StriderCorePlugin)
//!     .add_plugins(strider_gait::StriderGaitPlugin)
//!     .add_plugins(StriderTeleopPlugin);
//! app.world_mut()
//!     .resource_mut::<CommandQueue>()
//!     .push_line("target 2 0 -1")
//!     .unwrap();
//! app.update();
//! ```

pub mod commander;
pub mod cursor;
pub mod systems;

use bevy::prelude::*;
use strider_core::StriderSet;
use strider_gait::LocomotionInput;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use commander::{Command, CommandQueue, InputState};
pub use cursor::{Ray, cursor_ray, ground_intersection, pick_ground, screen_to_ndc};

// ---------------------------------------------------------------------------
// StriderTeleopPlugin
// ---------------------------------------------------------------------------

/// Bevy plugin that feeds queued input commands to the controller.
///
/// Runs in [`StriderSet::Input`], before the controller steps.
pub struct StriderTeleopPlugin;

impl Plugin for StriderTeleopPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandQueue>()
            .init_resource::<InputState>()
            .init_resource::<LocomotionInput>()
            .add_systems(Update, systems::apply_commands.in_set(StriderSet::Input));
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{Command, CommandQueue, InputState, StriderTeleopPlugin};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use strider_gait::{ControllerConfig, Locomotion, LocomotionController, StriderGaitPlugin};

    #[test]
    fn plugin_builds_without_panic() {
        let mut app = App::new();
        app.add_plugins(strider_core::StriderCorePlugin);
        app.add_plugins(StriderTeleopPlugin);
        app.finish();
        app.cleanup();
        app.update();

        assert!(app.world().get_resource::<CommandQueue>().is_some());
        assert!(app.world().get_resource::<InputState>().is_some());
        assert!(app.world().get_resource::<LocomotionInput>().is_some());
    }

    #[test]
    fn commands_steer_the_robot() {
        let mut app = App::new();
        app.add_plugins((strider_core::StriderCorePlugin, StriderGaitPlugin, StriderTeleopPlugin));
        let controller = LocomotionController::new(ControllerConfig::quadruped()).unwrap();
        app.insert_resource(Locomotion::new(controller));
        app.finish();
        app.cleanup();

        app.world_mut()
            .resource_mut::<CommandQueue>()
            .push_line("target 0 0 3")
            .unwrap();
        for _ in 0..240 {
            app.update();
        }
        let body = app.world().resource::<Locomotion>().controller.body_position();
        assert!((body - Vector3::new(0.0, 0.0, 3.0)).norm() < 0.05, "body at {body:?}");

        // Stop freezes the target at the current body position.
        app.world_mut().resource_mut::<CommandQueue>().push(Command::Stop);
        app.update();
        let target = app.world().resource::<LocomotionInput>().target;
        assert!((target - Vector3::new(0.0, 0.0, 3.0)).norm() < 0.05);
    }
}
