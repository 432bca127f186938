//! Ballistic projectiles with drag, ground bounce and a fading trail.

use std::collections::VecDeque;

use nalgebra::Vector3;
use tracing::trace;

/// Gravitational acceleration.
pub const GRAVITY: Vector3<f64> = Vector3::new(0.0, -9.8, 0.0);
/// Sphere radius; also the resting height above the ground.
pub const RADIUS: f64 = 0.12;
/// Quadratic drag coefficient.
pub const DRAG: f64 = 0.01;
/// Fraction of vertical speed kept on a bounce.
pub const RESTITUTION: f64 = 0.8;
/// Seconds before a projectile expires.
pub const LIFETIME: f64 = 3.0;
/// Trail points kept per projectile.
pub const TRAIL_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Projectile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    age: f64,
    trail: VecDeque<Vector3<f64>>,
}

impl Projectile {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        let mut trail = VecDeque::with_capacity(TRAIL_LENGTH);
        trail.push_back(position);
        Self {
            position,
            velocity,
            age: 0.0,
            trail,
        }
    }

    /// Integrate one step: move with the old velocity, then apply gravity and
    /// drag. Below one radius the sphere is pushed back up and a downward
    /// velocity is reflected. A non-finite or non-positive `dt` is ignored.
    pub fn update(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.position += self.velocity * dt;
        let speed_sq = self.velocity.norm_squared();
        self.velocity += GRAVITY * dt - self.velocity * (speed_sq * DRAG * dt);
        if self.position.y < RADIUS {
            if self.velocity.y < 0.0 {
                self.velocity.y *= -RESTITUTION;
            }
            self.position.y = RADIUS;
        }

        self.age += dt;
        self.trail.push_back(self.position);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    pub const fn age(&self) -> f64 {
        self.age
    }

    pub fn is_expired(&self) -> bool {
        self.age > LIFETIME
    }

    /// Render scale, shrinking from 1 to 0 over the lifetime.
    pub fn scale(&self) -> f64 {
        let s = (self.age / LIFETIME).clamp(0.0, 1.0);
        1.0 - s * s * s
    }

    /// Recent positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.trail.iter()
    }
}

// ---------------------------------------------------------------------------
// ProjectileWorld
// ---------------------------------------------------------------------------

/// Every live projectile. The world owns them; expired ones are dropped on update.
#[derive(Debug, Clone, Default)]
pub struct ProjectileWorld {
    projectiles: Vec<Projectile>,
    expired: usize,
}

impl ProjectileWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    /// Step every projectile and drop the ones that expired.
    pub fn update(&mut self, dt: f64) {
        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        let before = self.projectiles.len();
        self.projectiles.retain(|p| !p.is_expired());
        let dropped = before - self.projectiles.len();
        if dropped > 0 {
            trace!(dropped, live = self.projectiles.len(), "projectiles expired");
        }
        self.expired += dropped;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Projectiles removed since creation.
    pub const fn expired(&self) -> usize {
        self.expired
    }
}
