//! Swing foot profile.
//!
//! A swinging foot slides toward its landing point in a straight line while a
//! height bump lifts it off the ground. The bump is a quartic in the
//! remaining-distance fraction `s`: zero with zero slope at lift-off (`s = 1`)
//! and at touchdown (`s = 0`), peaking at `scale / 2` halfway.

/// Swing height for remaining-distance fraction `s` (clamped to `[0, 1]`).
///
/// `h(s) = 8 · scale · s² · (1 − s)²`
pub fn step_height(s: f64, scale: f64) -> f64 {
    let s = s.clamp(0.0, 1.0);
    let u = 1.0 - s;
    8.0 * scale * s * s * u * u
}

/// Remaining-distance fraction of a swing: `remaining / liftoff_distance`.
///
/// Zero when the swing was started with no distance to cover.
pub fn remaining_fraction(remaining: f64, liftoff_distance: f64) -> f64 {
    if liftoff_distance > 0.0 {
        (remaining / liftoff_distance).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Body speed that drives the swing foot.
///
/// Combines linear speed with the tangential speed of the stance circle under
/// yaw, and never drops below `min_speed` so feet still settle when the body
/// stands still.
pub fn swing_speed(body_speed: f64, yaw_rate: f64, stance_radius: f64, min_speed: f64) -> f64 {
    body_speed.hypot(yaw_rate * stance_radius).max(min_speed)
}
