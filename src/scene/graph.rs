//! Scene graph arena
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`].
//! Parents are back-references, so the hierarchy needs no shared ownership
//! and composition can walk it with a plain explicit stack.

use crate::errors::{AnimationError, Result};
use crate::scene::NodeId;
use crate::scene::node::Node;

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    /// Validates an externally built node list and derives its roots.
    ///
    /// Every parent link must be mirrored by the parent's child list (and the
    /// other way round), ids must be in range, and every node must be reachable
    /// exactly once from a root. Anything else is rejected as
    /// [`AnimationError::InvalidHierarchy`].
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        let len = nodes.len();

        for (index, node) in nodes.iter().enumerate() {
            let id = NodeId(index);

            if let Some(parent) = node.parent {
                let Some(parent_node) = nodes.get(parent.index()) else {
                    return Err(invalid(format!("{id:?} has out-of-range parent {parent:?}")));
                };
                if !parent_node.children.contains(&id) {
                    return Err(invalid(format!(
                        "{id:?} names {parent:?} as parent, but is not among its children"
                    )));
                }
            }

            for &child in &node.children {
                let Some(child_node) = nodes.get(child.index()) else {
                    return Err(invalid(format!("{id:?} has out-of-range child {child:?}")));
                };
                if child_node.parent != Some(id) {
                    return Err(invalid(format!(
                        "{child:?} is a child of {id:?}, but its parent is {:?}",
                        child_node.parent
                    )));
                }
            }
        }

        let roots: Vec<NodeId> = (0..len)
            .filter(|&i| nodes[i].parent.is_none())
            .map(NodeId)
            .collect();

        // Each node has a single parent, so a node that is unreachable from
        // the roots sits on a parent cycle; one reached twice is listed twice.
        let mut visited = vec![false; len];
        let mut stack = roots.clone();
        let mut reached = 0;
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id.index()], true) {
                return Err(invalid(format!("{id:?} is reachable more than once")));
            }
            reached += 1;
            stack.extend_from_slice(&nodes[id.index()].children);
        }
        if reached != len {
            return Err(invalid(format!(
                "{} nodes form a parent cycle",
                len - reached
            )));
        }

        Ok(Self { nodes, roots })
    }

    #[must_use]
    pub fn builder() -> SceneGraphBuilder {
        SceneGraphBuilder::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Parentless nodes, in id order.
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }
}

/// Incremental construction of a [`SceneGraph`].
#[derive(Debug, Default)]
pub struct SceneGraphBuilder {
    nodes: Vec<Node>,
    links: Vec<(NodeId, NodeId)>,
}

impl SceneGraphBuilder {
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Records `child` under `parent`. Links are applied and checked in
    /// [`Self::build`].
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> &mut Self {
        self.links.push((parent, child));
        self
    }

    pub fn build(self) -> Result<SceneGraph> {
        let Self { mut nodes, links } = self;
        let len = nodes.len();

        for (parent, child) in links {
            if parent.index() >= len || child.index() >= len {
                return Err(invalid(format!(
                    "cannot attach {child:?} to {parent:?}: graph has {len} nodes"
                )));
            }
            if parent == child {
                return Err(invalid(format!("{child:?} cannot be its own parent")));
            }
            if let Some(previous) = nodes[child.index()].parent {
                return Err(invalid(format!(
                    "{child:?} is already attached to {previous:?}"
                )));
            }
            nodes[child.index()].parent = Some(parent);
            nodes[parent.index()].children.push(child);
        }

        SceneGraph::new(nodes)
    }
}

fn invalid(reason: String) -> AnimationError {
    AnimationError::InvalidHierarchy(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_are_parentless_nodes() {
        let mut builder = SceneGraph::builder();
        let a = builder.add(Node::new());
        let b = builder.add(Node::new());
        let c = builder.add(Node::new());
        builder.attach(a, b);
        let graph = builder.build().unwrap();

        assert_eq!(graph.roots(), &[a, c]);
        assert_eq!(graph.node(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn rejects_cycle() {
        let mut builder = SceneGraph::builder();
        let a = builder.add(Node::new());
        let b = builder.add(Node::new());
        builder.attach(a, b).attach(b, a);

        assert!(matches!(
            builder.build(),
            Err(AnimationError::InvalidHierarchy(_))
        ));
    }

    #[test]
    fn rejects_one_sided_link() {
        let mut child = Node::new();
        child.set_parent(Some(NodeId(0)));
        let result = SceneGraph::new(vec![Node::new(), child]);

        assert!(matches!(result, Err(AnimationError::InvalidHierarchy(_))));
    }
}
