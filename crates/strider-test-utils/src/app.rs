//! Bevy test app builders.

use bevy::prelude::*;
use strider_gait::{ControllerConfig, Locomotion, LocomotionController, StriderGaitPlugin, spawn_robot};

/// Create a minimal test app with only the core plugin.
///
/// Provides `StriderSet` ordering and the time resources but no controller.
pub fn minimal_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(strider_core::StriderCorePlugin);
    app.finish();
    app.cleanup();
    app
}

/// Create an app with the core and gait plugins and a spawned robot.
///
/// The controller starts at the origin facing +X.
pub fn locomotion_test_app(config: ControllerConfig) -> App {
    let mut app = App::new();
    app.add_plugins((strider_core::StriderCorePlugin, StriderGaitPlugin));
    let controller = LocomotionController::new(config)
        .unwrap_or_else(|err| panic!("invalid test controller config: {err}"));
    spawn_robot(app.world_mut(), &controller);
    app.insert_resource(Locomotion::new(controller));
    app.finish();
    app.cleanup();
    app
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
