//! Simulation wiring for Strider.
//!
//! - [`SceneGraph`]: in-memory transform hierarchy implementing
//!   [`Scene`](strider_core::traits::Scene)
//! - [`Armament`] and [`ProjectileWorld`]: weapons and their ballistic shots
//! - [`Armory`]: both of the above posed from controller output
//! - [`GaitStats`]: cumulative stepping statistics
//! - [`Simulation`]: the whole robot stepped without an ECS
//! - [`StriderSimPlugin`]: meta-plugin for Bevy hosts
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use strider_sim::StriderSimPlugin;
//!
//! App::new()
//!     .add_plugins(StriderSimPlugin)
//!     .run();
//! ```

pub mod armory;
pub mod projectile;
pub mod scene;
pub mod simulation;
pub mod stats;
pub mod weapon;

use bevy::prelude::*;
use strider_core::StriderSet;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use armory::{Armory, armory_system};
pub use projectile::{Projectile, ProjectileWorld};
pub use scene::{SceneGraph, build_robot};
pub use simulation::Simulation;
pub use stats::GaitStats;
pub use weapon::{Armament, Weapon};

// ---------------------------------------------------------------------------
// StriderSimPlugin
// ---------------------------------------------------------------------------

/// Meta-plugin that adds the full Strider control stack.
///
/// Includes:
/// - [`StriderCorePlugin`](strider_core::StriderCorePlugin): system ordering and `SimTime`
/// - [`StriderTeleopPlugin`](strider_teleop::StriderTeleopPlugin): queued input commands
/// - [`StriderGaitPlugin`](strider_gait::StriderGaitPlugin): controller stepping and transforms
/// - [`GaitStats`] resource and tracking system
/// - [`armory_system`], which consumes fire requests every tick
///
/// Does not insert a controller; add a
/// [`Locomotion`](strider_gait::Locomotion) resource and call
/// [`spawn_robot`](strider_gait::spawn_robot) to get a walking robot. Insert
/// an [`Armory`] as well to have fire requests launch projectiles.
pub struct StriderSimPlugin;

impl Plugin for StriderSimPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(strider_core::StriderCorePlugin)
            .add_plugins(strider_teleop::StriderTeleopPlugin)
            .add_plugins(strider_gait::StriderGaitPlugin)
            .init_resource::<GaitStats>()
            .add_systems(
                Update,
                (stats::gait_stats_system, armory::armory_system).in_set(StriderSet::Emit),
            );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
