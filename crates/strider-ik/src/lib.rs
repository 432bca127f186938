//! Inverse kinematics for Strider legs.
//!
//! Every leg is a hip yaw joint followed by a planar two-link arm, so the
//! whole problem has a closed-form answer:
//!
//! ```text
//! foot (body frame) ──► LegSolver ──► pivot + (reach, lift) ──► TwoLinkSolver ──► joint angles
//! ```
//!
//! Solving never fails at runtime. Targets outside the reachable annulus fall
//! back to a fully extended or folded pose, reported through [`IkBranch`].
//! Invalid link lengths are rejected when a solver is built.

pub mod leg;
pub mod two_link;

pub use leg::{LegJoints, LegSolver};
pub use two_link::{IkBranch, JointAngles, TwoLinkSolver, forward_two_link, solve_two_link};
