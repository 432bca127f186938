use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Opaque handle to a node owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The transform hierarchy the controller writes its pose into.
///
/// The scene owns parent chains and world-transform composition. Callers
/// only ever touch the local pose of nodes they were handed.
pub trait Scene {
    /// Set a node's translation relative to its parent.
    fn set_local_position(&mut self, node: NodeId, position: Vector3<f64>);

    /// Set a node's rotation relative to its parent.
    fn set_local_rotation(&mut self, node: NodeId, rotation: UnitQuaternion<f64>);
}

impl<S: Scene + ?Sized> Scene for &mut S {
    fn set_local_position(&mut self, node: NodeId, position: Vector3<f64>) {
        (**self).set_local_position(node, position);
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: UnitQuaternion<f64>) {
        (**self).set_local_rotation(node, rotation);
    }
}
