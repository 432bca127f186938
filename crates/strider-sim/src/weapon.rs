//! Body-mounted weapons with filtered recoil.
//!
//! Firing kicks the recoil filter's velocity; each tick the filter relaxes
//! back to zero and its output pitches the weapon about its local Z axis.

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
use strider_core::error::ConfigError;
use strider_core::traits::{NodeId, Scene};
use strider_gait::{FilterParams, SecondOrderFilter};
use tracing::debug;

use crate::projectile::Projectile;
use crate::scene::SceneGraph;

/// Muzzle position in the weapon frame.
pub const MUZZLE_OFFSET: Vector3<f64> = Vector3::new(1.4, 0.0, 0.0);
/// Projectile launch speed.
pub const MUZZLE_SPEED: f64 = 50.0;
/// Minimum seconds between two shots of the same weapon.
pub const COOLDOWN: f64 = 0.2;
/// Recoil velocity applied per shot (rad/s).
pub const RECOIL_KICK: f64 = 3.0;
/// Head mount above the body origin.
pub const HEAD_OFFSET: Vector3<f64> = Vector3::new(0.0, 1.05, 0.0);
/// Lateral distance of each weapon from the head centre.
pub const ARM_OFFSET: f64 = 0.8;

const RECOIL: FilterParams = FilterParams {
    f: 1.0,
    z: 0.2,
    r: 1.0,
};

// ---------------------------------------------------------------------------
// Weapon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Weapon {
    node: NodeId,
    recoil: SecondOrderFilter<f64>,
    since_fire: f64,
}

impl Weapon {
    pub fn new(node: NodeId) -> Result<Self, ConfigError> {
        Ok(Self {
            node,
            recoil: SecondOrderFilter::new(RECOIL, 0.0)?,
            since_fire: COOLDOWN,
        })
    }

    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Current recoil pitch (radians).
    pub fn recoil(&self) -> f64 {
        self.recoil.y()
    }

    pub fn ready(&self) -> bool {
        self.since_fire >= COOLDOWN
    }

    /// Launch a projectile from the muzzle, given the weapon's world transform.
    ///
    /// Returns `None` while cooling down.
    pub fn fire(&mut self, world: &Isometry3<f64>) -> Option<Projectile> {
        if !self.ready() {
            return None;
        }
        let muzzle = (world * Point3::from(MUZZLE_OFFSET)).coords;
        let velocity = world.rotation * Vector3::x() * MUZZLE_SPEED;
        self.recoil.set_yd(RECOIL_KICK);
        self.since_fire = 0.0;
        debug!(node = self.node.0, x = muzzle.x, y = muzzle.y, z = muzzle.z, "weapon fired");
        Some(Projectile::new(muzzle, velocity))
    }

    /// Relax the recoil and write the weapon's pitch into `scene`.
    pub fn update<S: Scene + ?Sized>(&mut self, dt: f64, scene: &mut S) {
        self.recoil.update(dt, 0.0);
        if dt.is_finite() && dt > 0.0 {
            self.since_fire += dt;
        }
        scene.set_local_rotation(
            self.node,
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.recoil.y()),
        );
    }
}

// ---------------------------------------------------------------------------
// Armament
// ---------------------------------------------------------------------------

/// A pair of weapons that take turns firing.
#[derive(Debug, Clone)]
pub struct Armament {
    weapons: [Weapon; 2],
    next: usize,
}

impl Armament {
    /// Add a head above `body` with one weapon on each side.
    pub fn mount(graph: &mut SceneGraph, body: NodeId) -> Result<Self, ConfigError> {
        let head = graph.add_node(Some(body), HEAD_OFFSET);
        let left = graph.add_node(Some(head), Vector3::new(0.0, 0.0, -ARM_OFFSET));
        let right = graph.add_node(Some(head), Vector3::new(0.0, 0.0, ARM_OFFSET));
        Ok(Self {
            weapons: [Weapon::new(left)?, Weapon::new(right)?],
            next: 1,
        })
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Fire the weapon whose turn it is. The turn only passes on a shot.
    pub fn fire(&mut self, graph: &SceneGraph) -> Option<Projectile> {
        let weapon = &mut self.weapons[self.next];
        let world = graph.world_transform(weapon.node())?;
        let projectile = weapon.fire(&world)?;
        self.next = 1 - self.next;
        Some(projectile)
    }

    pub fn update(&mut self, dt: f64, graph: &mut SceneGraph) {
        for weapon in &mut self.weapons {
            weapon.update(dt, graph);
        }
    }
}
