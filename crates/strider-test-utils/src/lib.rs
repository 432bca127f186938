//! Shared test fixtures and utilities for Strider crates.
//!
//! Provides Bevy test app builders, controller configurations, scripted
//! target paths and deterministic RNG setup.

pub mod app;
pub mod fixtures;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use app::{locomotion_test_app, minimal_test_app};
pub use fixtures::{
    eager_quadruped_config, groups_swinging, hexapod_config, quadruped_config, square_waypoints,
    waypoint_at,
};
pub use rng::{ground_points, random_ground_point, seeded_rng};
