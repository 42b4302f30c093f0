//! Scene graph module
//!
//! Read-only node hierarchy plus the per-frame data derived from it:
//! - Node: authored defaults and hierarchy links
//! - SceneGraph: arena of nodes indexed by [`NodeId`]
//! - Transform: TRS component
//! - NodeTransformTable: resolved local/global transforms for one frame
//! - TransformSystem: hierarchy composition
//! - Skeleton: skins and joint matrix buffers

pub mod graph;
pub mod node;
pub mod pose;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use graph::{SceneGraph, SceneGraphBuilder};
pub use node::Node;
pub use pose::NodeTransformTable;
pub use skeleton::{JointMatrixBuffer, Skin};
pub use transform::Transform;

/// Index of a node in its [`SceneGraph`] arena.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index)
    }
}
