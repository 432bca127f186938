//! Self-contained simulation loop without an ECS.
//!
//! [`Simulation`] owns the controller and an [`Armory`] holding the scene
//! graph, weapons and projectiles, and advances them together one fixed tick
//! at a time.

use std::time::Duration;

use nalgebra::Vector3;
use strider_core::error::ConfigError;
use strider_core::time::TickClock;
use strider_gait::{ControllerConfig, ControllerOutput, LocomotionController, RobotRig};
use strider_teleop::{Command, InputState};

use crate::armory::{Armory, sanitize_dt};
use crate::projectile::ProjectileWorld;
use crate::scene::SceneGraph;
use crate::stats::GaitStats;
use crate::weapon::Armament;

#[derive(Debug, Clone)]
pub struct Simulation {
    controller: LocomotionController,
    armory: Armory,
    input: InputState,
    stats: GaitStats,
    last_output: Option<ControllerOutput>,
}

impl Simulation {
    /// Build a robot standing at the origin facing +X.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        let controller = LocomotionController::new(config)?;
        let armory = Armory::new(&controller)?;
        // Looking straight ahead keeps the robot from turning on its first tick.
        let input = InputState::new(Vector3::zeros(), Vector3::x());
        Ok(Self {
            controller,
            armory,
            input,
            stats: GaitStats::new(),
            last_output: None,
        })
    }

    /// Fold an input command into the current target and cursor.
    pub fn apply(&mut self, command: Command) {
        let body = self.controller.body_position();
        self.input.apply(command, &body);
    }

    /// Advance everything by `dt` seconds.
    ///
    /// A non-finite or negative `dt` is treated as zero: the current pose is
    /// re-emitted and no filter, weapon or projectile is integrated.
    pub fn step(&mut self, dt: f64) -> &ControllerOutput {
        let dt = sanitize_dt(dt);
        let output = self
            .controller
            .step(dt, self.input.target, self.input.cursor);
        let fire = self.input.take_fire();
        self.armory.step(dt, &output, fire);
        self.stats.record(&output);
        self.last_output.insert(output)
    }

    /// Feed one frame of wall time and run every tick it pays for.
    ///
    /// Returns the number of ticks run.
    pub fn run_frame(&mut self, clock: &mut TickClock, delta: Duration) -> u32 {
        clock.feed(delta);
        let mut ticks = 0;
        while clock.next_tick() {
            self.step(clock.dt());
            ticks += 1;
        }
        ticks
    }

    pub const fn controller(&self) -> &LocomotionController {
        &self.controller
    }

    pub const fn scene(&self) -> &SceneGraph {
        self.armory.scene()
    }

    pub const fn rig(&self) -> &RobotRig {
        self.armory.rig()
    }

    pub const fn input(&self) -> &InputState {
        &self.input
    }

    pub const fn projectiles(&self) -> &ProjectileWorld {
        self.armory.projectiles()
    }

    pub const fn stats(&self) -> &GaitStats {
        &self.stats
    }

    pub const fn armament(&self) -> &Armament {
        self.armory.armament()
    }

    /// Output of the most recent tick.
    pub const fn last_output(&self) -> Option<&ControllerOutput> {
        self.last_output.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    fn sim() -> Simulation {
        Simulation::new(ControllerConfig::quadruped()).unwrap()
    }

    #[test]
    fn walks_to_commanded_target() {
        let mut sim = sim();
        sim.apply(Command::SetTarget(Vector3::new(3.0, 0.0, 0.0)));
        for _ in 0..900 {
            sim.step(DT);
        }
        let body = sim.controller().body_position();
        assert_relative_eq!(body, Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-2);
        assert!(sim.stats().lift_offs > 0);
        assert_eq!(sim.stats().ticks, 900);
    }

    #[test]
    fn scene_matches_controller_output() {
        let mut sim = sim();
        // Lean is cosmetic and not solved for, so compare once the body has settled.
        sim.apply(Command::SetTarget(Vector3::new(1.0, 0.0, 1.0)));
        for _ in 0..600 {
            sim.step(DT);
        }
        let out = sim.last_output().unwrap().clone();
        let body = sim.scene().world_transform(sim.rig().body).unwrap();
        assert_relative_eq!(body.translation.vector, out.body.position, epsilon = 1e-12);

        for (pose, (nodes, solver)) in out
            .legs
            .iter()
            .zip(sim.rig().legs.iter().zip(sim.controller().solvers()))
        {
            let tip = Vector3::new(solver.links().l2(), 0.0, 0.0);
            let foot = sim.scene().world_point(nodes.knee, &tip).unwrap();
            assert_relative_eq!(foot, pose.foot, epsilon = 1e-4);
        }
    }

    #[test]
    fn fire_spawns_projectile_that_expires() {
        let mut sim = sim();
        sim.apply(Command::Fire);
        sim.step(DT);
        assert_eq!(sim.projectiles().len(), 1);
        assert!(!sim.input().fire_requested());

        for _ in 0..200 {
            sim.step(DT);
        }
        assert!(sim.projectiles().is_empty());
        assert_eq!(sim.projectiles().expired(), 1);
    }

    #[test]
    fn nan_tick_does_not_poison_projectiles() {
        let mut sim = sim();
        sim.apply(Command::Fire);
        sim.step(DT);
        assert_eq!(sim.projectiles().len(), 1);

        sim.step(f64::NAN);
        sim.step(-DT);
        let shot = sim.projectiles().iter().next().unwrap();
        assert!(shot.position.iter().all(|c| c.is_finite()));
        assert!(sim.controller().body_position().iter().all(|c| c.is_finite()));

        for _ in 0..600 {
            sim.step(DT);
        }
        assert!(sim.projectiles().is_empty());
        assert_eq!(sim.projectiles().expired(), 1);
    }

    #[test]
    fn stop_holds_position() {
        let mut sim = sim();
        sim.apply(Command::SetTarget(Vector3::new(5.0, 0.0, 0.0)));
        for _ in 0..60 {
            sim.step(DT);
        }
        sim.apply(Command::Stop);
        let stopped_at = sim.input().target;
        for _ in 0..600 {
            sim.step(DT);
        }
        assert!(stopped_at.x < 5.0);
        assert_relative_eq!(sim.controller().body_position(), stopped_at, epsilon = 1e-2);
    }

    #[test]
    fn frame_runs_whole_ticks() {
        let mut sim = sim();
        let mut clock = TickClock::new(0.01);
        assert_eq!(sim.run_frame(&mut clock, Duration::from_millis(35)), 3);
        assert_eq!(sim.run_frame(&mut clock, Duration::from_millis(5)), 1);
        assert_eq!(sim.stats().ticks, 4);
    }
}
