//! Transform System
//!
//! Composes the local transforms of a [`NodeTransformTable`] into world
//! transforms by walking the scene graph from its roots.
//!
//! The system only borrows the graph (read-only) and the table, never a
//! whole model, and must run after *all* local transforms of the frame have
//! been written: a child's world matrix is derived from its parent's, so a
//! parent that is still being animated would leak a stale pose downward.

use glam::Affine3A;

use crate::scene::{NodeId, NodeTransformTable, SceneGraph};

/// Reusable traversal stack, kept by the caller so composition does not
/// allocate once it has grown to the graph's depth.
pub type HierarchyStack = Vec<(NodeId, Affine3A)>;

/// Updates every world matrix in `table`.
///
/// Depth-first with an explicit stack: `world = parent_world * local`,
/// roots start from identity.
pub fn update_hierarchy(graph: &SceneGraph, table: &mut NodeTransformTable, stack: &mut HierarchyStack) {
    stack.clear();

    // Reverse so that roots and siblings are visited in id order.
    for &root in graph.roots().iter().rev() {
        stack.push((root, Affine3A::IDENTITY));
    }

    propagate(graph, table, stack);
}

fn propagate(graph: &SceneGraph, table: &mut NodeTransformTable, stack: &mut HierarchyStack) {
    while let Some((id, parent_world)) = stack.pop() {
        let Some(local) = table.local(id) else {
            continue;
        };

        let world = parent_world * local.local_matrix();
        table.set_global(id, world);

        if let Some(node) = graph.node(id) {
            for &child in node.children().iter().rev() {
                stack.push((child, world));
            }
        }
    }
}
