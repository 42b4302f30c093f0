#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod errors;
pub mod model;
pub mod scene;
pub mod settings;

pub use animation::{
    ActionHandle, ActiveAnimation, AnimationChannel, AnimationClip, AnimationMixer,
    InterpolationMode, KeyframeTrack, MorphWeightData, RepeatMode, TargetPath, TrackData,
    WeightedBlender,
};
pub use errors::{AnimationError, Result};
pub use model::{AnimatedModel, ClipKey, DrawTransform, WeightedClip};
pub use scene::{JointMatrixBuffer, Node, NodeId, NodeTransformTable, SceneGraph, Skin, Transform};
pub use settings::{AnimationSettings, MAX_JOINTS};
