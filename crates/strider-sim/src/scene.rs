//! In-memory transform hierarchy.
//!
//! Nodes hold a local translation and rotation; a node's world transform is
//! its parent's world transform followed by its own `T · R`.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use strider_core::traits::{NodeId, Scene};
use strider_gait::{LegNodes, LocomotionController, RobotRig};

#[derive(Debug, Clone, PartialEq)]
struct Node {
    parent: Option<NodeId>,
    translation: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// SceneGraph
// ---------------------------------------------------------------------------

/// A flat arena of parent-linked nodes.
///
/// Parents are always created before their children, so a parent chain can
/// never form a cycle.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `translation` relative to `parent` (or the world).
    ///
    /// A `parent` that does not exist is treated as the world.
    pub fn add_node(&mut self, parent: Option<NodeId>, translation: Vector3<f64>) -> NodeId {
        let parent = parent.filter(|p| p.0 < self.nodes.len());
        self.nodes.push(Node {
            parent,
            translation,
            rotation: UnitQuaternion::identity(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Local `T · R` of `node`.
    pub fn local_transform(&self, node: NodeId) -> Option<Isometry3<f64>> {
        self.nodes
            .get(node.0)
            .map(|n| Isometry3::from_parts(Translation3::from(n.translation), n.rotation))
    }

    /// World transform of `node`: every ancestor's local transform, root first.
    pub fn world_transform(&self, node: NodeId) -> Option<Isometry3<f64>> {
        let mut transform = self.local_transform(node)?;
        let mut current = self.parent(node);
        while let Some(parent) = current {
            transform = self.local_transform(parent)? * transform;
            current = self.parent(parent);
        }
        Some(transform)
    }

    /// World position of a point given in `node`'s local frame.
    pub fn world_point(&self, node: NodeId, local: &Vector3<f64>) -> Option<Vector3<f64>> {
        self.world_transform(node)
            .map(|t| (t * Point3::from(*local)).coords)
    }
}

impl Scene for SceneGraph {
    fn set_local_position(&mut self, node: NodeId, position: Vector3<f64>) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.translation = position;
        }
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: UnitQuaternion<f64>) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.rotation = rotation;
        }
    }
}

/// Add the body, hip and knee nodes for `controller` to `graph`.
///
/// Hips sit at their attach points on the body and knees one upper link along
/// the hip's X axis, matching what [`LegJoints`](strider_ik::LegJoints)
/// rotations expect.
pub fn build_robot(graph: &mut SceneGraph, controller: &LocomotionController) -> RobotRig {
    let body = graph.add_node(None, Vector3::zeros());
    let legs = controller
        .solvers()
        .iter()
        .map(|solver| {
            let hip = graph.add_node(Some(body), solver.hip_offset());
            let knee = graph.add_node(Some(hip), Vector3::new(solver.links().l1(), 0.0, 0.0));
            LegNodes { hip, knee }
        })
        .collect();
    RobotRig { body, legs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;
    use strider_gait::ControllerConfig;

    #[test]
    fn world_transform_composes_parents() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, Vector3::new(1.0, 0.0, 0.0));
        let child = graph.add_node(Some(root), Vector3::new(0.0, 2.0, 0.0));
        graph.set_local_rotation(root, UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2));

        // Rotating the root a quarter turn about Z swings the child's +Y offset onto -X.
        let p = graph.world_point(child, &Vector3::zeros()).unwrap();
        assert_relative_eq!(p, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn unknown_nodes_are_ignored() {
        let mut graph = SceneGraph::new();
        graph.set_local_position(NodeId(7), Vector3::x());
        assert!(graph.world_transform(NodeId(7)).is_none());
        let orphan = graph.add_node(Some(NodeId(3)), Vector3::zeros());
        assert!(graph.parent(orphan).is_none());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn rig_follows_controller_feet() {
        let mut controller = LocomotionController::new(ControllerConfig::quadruped()).unwrap();
        let mut graph = SceneGraph::new();
        let rig = build_robot(&mut graph, &controller);
        assert_eq!(graph.len(), 1 + 2 * 4);

        let out = controller.step(1.0 / 60.0, Vector3::zeros(), Vector3::new(5.0, 0.0, 0.0));
        out.apply_to(&rig, &mut graph);

        for (pose, (nodes, solver)) in out.legs.iter().zip(rig.legs.iter().zip(controller.solvers())) {
            let tip = Vector3::new(solver.links().l2(), 0.0, 0.0);
            let foot = graph.world_point(nodes.knee, &tip).unwrap();
            assert_relative_eq!(foot, pose.foot, epsilon = 1e-9);
        }
    }
}
