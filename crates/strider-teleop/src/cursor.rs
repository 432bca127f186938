//! Mouse picking on the ground plane.
//!
//! The camera looks down at the ground from a fixed direction. A screen
//! position is un-projected onto the near plane and then cast along the
//! camera's view direction, so picking behaves the same anywhere on screen.

use nalgebra::{Matrix4, Point3, Vector2, Vector3};

/// A ray in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn at(&self, t: f64) -> Vector3<f64> {
        self.origin + self.direction * t
    }
}

/// Normalized device coordinates (`[-1, 1]` on both axes, +Y up) of a window
/// position given in pixels from the bottom-left corner.
pub fn screen_to_ndc(x: f64, y: f64, width: f64, height: f64) -> Vector2<f64> {
    Vector2::new(x / width * 2.0 - 1.0, y / height * 2.0 - 1.0)
}

/// Pick ray through `ndc` for a camera with inverse view-projection
/// `inv_view_proj` looking along `view_dir`.
///
/// Returns `None` if the un-projected point is at infinity.
pub fn cursor_ray(
    ndc: &Vector2<f64>,
    inv_view_proj: &Matrix4<f64>,
    view_dir: &Vector3<f64>,
) -> Option<Ray> {
    let origin: Point3<f64> = inv_view_proj.transform_point(&Point3::new(ndc.x, ndc.y, 0.0));
    origin.coords.iter().all(|c| c.is_finite()).then_some(Ray {
        origin: origin.coords,
        direction: *view_dir,
    })
}

/// Intersection of `ray` with the ground plane `y = 0`.
///
/// `None` when the ray runs parallel to the ground or points away from it.
pub fn ground_intersection(ray: &Ray) -> Option<Vector3<f64>> {
    const PARALLEL_EPSILON: f64 = 1e-12;
    if ray.direction.y.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = -ray.origin.y / ray.direction.y;
    if t < 0.0 {
        return None;
    }
    let mut hit = ray.at(t);
    hit.y = 0.0;
    Some(hit)
}

/// Ground point under a window position, or `None` if the pick misses.
pub fn pick_ground(
    screen: (f64, f64),
    window: (f64, f64),
    inv_view_proj: &Matrix4<f64>,
    view_dir: &Vector3<f64>,
) -> Option<Vector3<f64>> {
    let ndc = screen_to_ndc(screen.0, screen.1, window.0, window.1);
    cursor_ray(&ndc, inv_view_proj, view_dir).and_then(|ray| ground_intersection(&ray))
}
