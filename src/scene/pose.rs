use glam::{Affine3A, Mat4};

use crate::animation::values::MorphWeightData;
use crate::scene::transform::Transform;
use crate::scene::{NodeId, SceneGraph};

/// Resolved per-node pose for the current frame.
///
/// Sized once for a graph; [`Self::reset`] restores the authored defaults at
/// the start of every evaluation pass, so nothing carries over between frames.
/// `globals` are only meaningful after the transform system has run.
#[derive(Debug, Clone, Default)]
pub struct NodeTransformTable {
    locals: Vec<Transform>,
    morph_weights: Vec<MorphWeightData>,
    globals: Vec<Affine3A>,
}

impl NodeTransformTable {
    /// Creates a table holding the graph's authored pose.
    #[must_use]
    pub fn new(graph: &SceneGraph) -> Self {
        let mut table = Self {
            locals: Vec::with_capacity(graph.len()),
            morph_weights: Vec::with_capacity(graph.len()),
            globals: Vec::with_capacity(graph.len()),
        };
        table.reset(graph);
        table
    }

    /// Overwrites every entry with the node's authored defaults.
    pub fn reset(&mut self, graph: &SceneGraph) {
        let len = graph.len();
        self.locals.resize(len, Transform::IDENTITY);
        self.morph_weights.resize_with(len, MorphWeightData::default);
        self.globals.resize(len, Affine3A::IDENTITY);

        for (i, node) in graph.nodes().iter().enumerate() {
            self.locals[i] = node.transform;
            self.morph_weights[i].clone_from(&node.morph_weights);
            self.globals[i] = Affine3A::IDENTITY;
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn local(&self, id: NodeId) -> Option<&Transform> {
        self.locals.get(id.index())
    }

    #[inline]
    pub fn local_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.locals.get_mut(id.index())
    }

    #[inline]
    #[must_use]
    pub fn morph_weights(&self, id: NodeId) -> Option<&MorphWeightData> {
        self.morph_weights.get(id.index())
    }

    #[inline]
    pub fn morph_weights_mut(&mut self, id: NodeId) -> Option<&mut MorphWeightData> {
        self.morph_weights.get_mut(id.index())
    }

    /// World transform computed by the last hierarchy pass.
    #[inline]
    #[must_use]
    pub fn global(&self, id: NodeId) -> Option<&Affine3A> {
        self.globals.get(id.index())
    }

    /// World transform as `Mat4`, ready for upload as a model matrix.
    #[inline]
    #[must_use]
    pub fn global_matrix(&self, id: NodeId) -> Option<Mat4> {
        self.global(id).copied().map(Mat4::from)
    }

    #[inline]
    #[must_use]
    pub fn globals(&self) -> &[Affine3A] {
        &self.globals
    }

    #[inline]
    pub(crate) fn set_global(&mut self, id: NodeId, world: Affine3A) {
        self.globals[id.index()] = world;
    }
}
