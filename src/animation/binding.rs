use crate::scene::NodeId;

/// Defines the target property for animation data.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation, // Maps to transform.position
    Rotation,    // Maps to transform.rotation
    Scale,       // Maps to transform.scale
    Weights,     // Maps to Morph Target weights
}

impl TargetPath {
    pub const COUNT: usize = 4;

    /// Dense index used by per-node accumulator arrays.
    #[inline]
    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            Self::Translation => 0,
            Self::Rotation => 1,
            Self::Scale => 2,
            Self::Weights => 3,
        }
    }
}

/// Binding relationship: maps channel `channel_index` of a clip to the
/// target property of `node` in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub channel_index: usize,
    pub node: NodeId,
    pub target: TargetPath,
}
