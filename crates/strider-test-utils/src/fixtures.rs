//! Controller configurations and scripted paths shared by tests.

use nalgebra::Vector3;
use strider_gait::{ControllerConfig, FilterParams, LegGaitState};

/// The default four-legged robot.
pub fn quadruped_config() -> ControllerConfig {
    ControllerConfig::quadruped()
}

/// The default six-legged robot.
pub fn hexapod_config() -> ControllerConfig {
    ControllerConfig::hexapod()
}

/// A quadruped with a stiff body filter, so the body runs ahead of its feet
/// and the gait is exercised hard.
pub fn eager_quadruped_config() -> ControllerConfig {
    ControllerConfig {
        position_filter: FilterParams::new(2.0, 0.6, 0.5),
        yaw_filter: FilterParams::new(2.0, 0.7, 0.0),
        ..ControllerConfig::quadruped()
    }
}

/// Corners of an axis-aligned square on the ground, counter-clockwise seen from above.
pub fn square_waypoints(half_extent: f64) -> [Vector3<f64>; 4] {
    let h = half_extent;
    [
        Vector3::new(h, 0.0, h),
        Vector3::new(h, 0.0, -h),
        Vector3::new(-h, 0.0, -h),
        Vector3::new(-h, 0.0, h),
    ]
}

/// Waypoint active at `tick` when each waypoint is held for `hold` ticks.
pub fn waypoint_at(waypoints: &[Vector3<f64>], tick: usize, hold: usize) -> Vector3<f64> {
    if waypoints.is_empty() {
        return Vector3::zeros();
    }
    waypoints[(tick / hold.max(1)) % waypoints.len()]
}

/// Whether any leg of the even and of the odd group is swinging.
pub fn groups_swinging(legs: &[LegGaitState]) -> [bool; 2] {
    let mut swinging = [false; 2];
    for (i, leg) in legs.iter().enumerate() {
        swinging[i % 2] |= leg.is_swinging();
    }
    swinging
}
