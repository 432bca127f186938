//! Weapons and projectiles posed from controller output.
//!
//! [`Armory`] keeps its own [`SceneGraph`] copy of the robot so the muzzle
//! transforms can be read back after each tick. It is used directly by
//! [`Simulation`](crate::Simulation) and as a resource by [`armory_system`].

use bevy::prelude::*;
use strider_core::config::SimConfig;
use strider_core::error::ConfigError;
use strider_gait::{ControllerOutput, Locomotion, LocomotionController, RobotRig};
use strider_teleop::InputState;
use tracing::{debug, warn};

use crate::projectile::ProjectileWorld;
use crate::scene::{SceneGraph, build_robot};
use crate::weapon::Armament;

/// Clamp a tick length to something the integrators can use.
pub(crate) fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}

#[derive(Debug, Clone, Resource)]
pub struct Armory {
    graph: SceneGraph,
    rig: RobotRig,
    armament: Armament,
    projectiles: ProjectileWorld,
}

impl Armory {
    /// Build the robot's scene graph from `controller` and mount both guns.
    pub fn new(controller: &LocomotionController) -> Result<Self, ConfigError> {
        let mut graph = SceneGraph::new();
        let rig = build_robot(&mut graph, controller);
        let armament = Armament::mount(&mut graph, rig.body)?;
        Ok(Self {
            graph,
            rig,
            armament,
            projectiles: ProjectileWorld::new(),
        })
    }

    /// Pose the scene from `output`, then advance weapons and projectiles.
    ///
    /// A fire request is honored after the recoil update so the shot leaves
    /// from this tick's muzzle. A zero or invalid `dt` still poses the scene
    /// and fires, but nothing is integrated.
    pub fn step(&mut self, dt: f64, output: &ControllerOutput, fire: bool) {
        let dt = sanitize_dt(dt);
        output.apply_to(&self.rig, &mut self.graph);
        if dt > 0.0 {
            self.armament.update(dt, &mut self.graph);
        }

        if fire {
            match self.armament.fire(&self.graph) {
                Some(projectile) => self.projectiles.spawn(projectile),
                None => debug!("fire request dropped while weapons cool down"),
            }
        }
        if dt > 0.0 {
            self.projectiles.update(dt);
        }
    }

    pub const fn scene(&self) -> &SceneGraph {
        &self.graph
    }

    pub const fn rig(&self) -> &RobotRig {
        &self.rig
    }

    pub const fn armament(&self) -> &Armament {
        &self.armament
    }

    pub const fn projectiles(&self) -> &ProjectileWorld {
        &self.projectiles
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Consume the fire latch every tick and, when an [`Armory`] is present,
/// advance it with the latest controller output.
///
/// Without an armory the request is logged and discarded so it never lingers
/// into a later tick.
#[allow(clippy::needless_pass_by_value)]
pub fn armory_system(
    config: Res<SimConfig>,
    locomotion: Option<Res<Locomotion>>,
    armory: Option<ResMut<Armory>>,
    mut input: ResMut<InputState>,
) {
    // Only touch the resource mutably when there is something to consume.
    let fire = input.fire_requested() && input.take_fire();
    let output = locomotion.as_ref().and_then(|l| l.output.as_ref());
    let (Some(mut armory), Some(output)) = (armory, output) else {
        if fire {
            warn!("fire request dropped: no armory mounted");
        }
        return;
    };
    armory.step(config.tick_dt, output, fire);
}
