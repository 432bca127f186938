//! Analytic inverse kinematics for a planar two-link arm.
//!
//! The arm's base sits at the origin of its own 2D plane: `x` is the reach
//! axis, `y` the lift axis. The first joint rotates about the base, the second
//! about the elbow. The solver always returns angles; targets outside the
//! reachable annulus fall back to a fully extended or fully folded pose.

use std::f64::consts::PI;

use nalgebra::Vector2;
use strider_core::error::ConfigError;

/// Which branch of the solver produced a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IkBranch {
    /// Target inside the annulus; elbow-down closed form.
    Reachable,
    /// Target beyond `l1 + l2`; arm fully extended toward it.
    TooFar,
    /// Target inside the annulus hole with the second link dominant; arm folded back.
    SecondLinkDominant,
    /// Target inside the annulus hole with the first link dominant.
    FirstLinkDominant,
    /// Cosine fell out of `[-1, 1]` by rounding only; clamped closed form.
    Clamped,
}

impl IkBranch {
    /// Whether the solution reconstructs the target exactly.
    pub const fn is_exact(self) -> bool {
        matches!(self, Self::Reachable | Self::Clamped)
    }
}

/// Joint angles of a two-link solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    /// First joint angle (radians), measured from the reach axis.
    pub theta1: f64,
    /// Second joint angle (radians), relative to the first link.
    pub theta2: f64,
    /// Branch taken by the solver.
    pub branch: IkBranch,
}

/// Solve the two-link problem for link lengths `l1`, `l2` and target `(x, y)`.
///
/// Never fails. Out-of-reach handling follows three independent checks in
/// order (too far, second link dominant, first link dominant); a later match
/// overrides an earlier one.
pub fn solve_two_link(l1: f64, l2: f64, x: f64, y: f64) -> JointAngles {
    let r_sqr = x * x + y * y;
    let c = (l1 * l1 + l2 * l2 - r_sqr) / (2.0 * l1 * l2);
    let heading = y.atan2(x);

    if (-1.0..=1.0).contains(&c) {
        return elbow_down(l1, l2, heading, c, IkBranch::Reachable);
    }

    let r = r_sqr.sqrt();
    let mut angles = elbow_down(l1, l2, heading, c.clamp(-1.0, 1.0), IkBranch::Clamped);
    if r_sqr > (l1 + l2) * (l1 + l2) {
        angles = JointAngles {
            theta1: heading,
            theta2: 0.0,
            branch: IkBranch::TooFar,
        };
    }
    if l2 > r + l1 {
        angles = JointAngles {
            theta1: PI + heading,
            theta2: PI,
            branch: IkBranch::SecondLinkDominant,
        };
    }
    if l1 > r + l2 {
        angles = JointAngles {
            theta1: heading,
            theta2: PI,
            branch: IkBranch::FirstLinkDominant,
        };
    }
    angles
}

fn elbow_down(l1: f64, l2: f64, heading: f64, c: f64, branch: IkBranch) -> JointAngles {
    let alpha = c.acos();
    JointAngles {
        theta1: heading + (l2 * alpha.sin()).atan2(l1 - l2 * alpha.cos()),
        theta2: alpha - PI,
        branch,
    }
}

/// Planar forward kinematics: the elbow-to-tip end point for the given angles.
pub fn forward_two_link(l1: f64, l2: f64, theta1: f64, theta2: f64) -> Vector2<f64> {
    Vector2::new(
        l1 * theta1.cos() + l2 * (theta1 + theta2).cos(),
        l1 * theta1.sin() + l2 * (theta1 + theta2).sin(),
    )
}

// ---------------------------------------------------------------------------
// TwoLinkSolver
// ---------------------------------------------------------------------------

/// A two-link solver bound to a validated pair of link lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoLinkSolver {
    l1: f64,
    l2: f64,
}

impl TwoLinkSolver {
    /// Create a solver. Both lengths must be positive and finite.
    pub fn new(l1: f64, l2: f64) -> Result<Self, ConfigError> {
        for length in [l1, l2] {
            if !(length > 0.0 && length.is_finite()) {
                return Err(ConfigError::InvalidLinkLength { leg: 0, length });
            }
        }
        Ok(Self { l1, l2 })
    }

    /// First link length.
    pub const fn l1(&self) -> f64 {
        self.l1
    }

    /// Second link length.
    pub const fn l2(&self) -> f64 {
        self.l2
    }

    /// Maximum reach (`l1 + l2`).
    pub fn max_reach(&self) -> f64 {
        self.l1 + self.l2
    }

    /// Minimum reach (`|l1 - l2|`).
    pub fn min_reach(&self) -> f64 {
        (self.l1 - self.l2).abs()
    }

    /// Solve for a planar target.
    pub fn solve(&self, x: f64, y: f64) -> JointAngles {
        solve_two_link(self.l1, self.l2, x, y)
    }

    /// Planar forward kinematics for this arm.
    pub fn forward(&self, theta1: f64, theta2: f64) -> Vector2<f64> {
        forward_two_link(self.l1, self.l2, theta1, theta2)
    }
}
