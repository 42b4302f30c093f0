pub mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod binding;
pub mod binder;
pub mod mixer;
pub mod blend;

pub use clip::{AnimationChannel, AnimationClip, TrackData, TrackValue};
pub use action::{ActiveAnimation, PlaybackState, RepeatMode};
pub use mixer::{ActionHandle, AnimationMixer, WeightedEntry};
pub use blend::WeightedBlender;
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::{Interpolatable, MorphWeightData};
