use crate::animation::values::MorphWeightData;
use crate::scene::NodeId;
use crate::scene::transform::Transform;

/// A read-only scene node as delivered by the asset layer.
///
/// # Hierarchy
///
/// Nodes form a forest through id links:
/// - `parent`: back-reference to the parent (None for root nodes)
/// - `children`: ids of child nodes
///
/// # Defaults
///
/// `transform` and `morph_weights` hold the authored pose. Every evaluation
/// pass starts from these values before animation is applied.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: Option<String>,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    /// Authored default TRS
    pub transform: Transform,
    /// Authored default morph target weights (empty if the mesh has none)
    pub morph_weights: MorphWeightData,

    /// Index into the model's skin list when this node draws a skinned mesh
    pub skin: Option<usize>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transform(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_skin(mut self, skin: usize) -> Self {
        self.skin = Some(skin);
        self
    }

    #[must_use]
    pub fn with_morph_weights(mut self, weights: MorphWeightData) -> Self {
        self.morph_weights = weights;
        self
    }

    /// Returns the parent node id, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns a read-only slice of child node ids.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Sets the parent of this node. Prefer [`SceneGraphBuilder::attach`]
    /// which keeps both parent and child in sync. This is exposed for asset
    /// importers that already carry both directions of the hierarchy.
    ///
    /// [`SceneGraphBuilder::attach`]: super::SceneGraphBuilder::attach
    #[inline]
    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Appends a child id. See [`Self::set_parent`].
    #[inline]
    pub fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }
}
