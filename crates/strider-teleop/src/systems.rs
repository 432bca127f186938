//! Bevy systems that turn queued commands into locomotion input.

use bevy::prelude::*;
use nalgebra::Vector3;
use strider_gait::{Locomotion, LocomotionInput};

use crate::commander::{CommandQueue, InputState};

// ---------------------------------------------------------------------------
// apply_commands
// ---------------------------------------------------------------------------

/// Drain [`CommandQueue`] into [`InputState`], then publish the target and
/// cursor as [`LocomotionInput`].
///
/// `Stop` resolves against the controller's current body position when a
/// [`Locomotion`] resource exists, and against the origin otherwise.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_commands(
    mut queue: ResMut<CommandQueue>,
    mut input: ResMut<InputState>,
    mut locomotion_input: ResMut<LocomotionInput>,
    locomotion: Option<Res<Locomotion>>,
) {
    let body = locomotion
        .as_ref()
        .map_or_else(Vector3::zeros, |l| l.controller.body_position());
    for command in queue.drain() {
        input.apply(command, &body);
    }
    locomotion_input.target = input.target;
    locomotion_input.cursor = input.cursor;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
