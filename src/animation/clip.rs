use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::{KeyframeCursor, KeyframeTrack};
use crate::animation::values::{Interpolatable, MorphWeightData};
use crate::errors::{AnimationError, Result};
use crate::scene::NodeId;

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    Scalar(KeyframeTrack<f32>),
    MorphWeights(KeyframeTrack<MorphWeightData>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            Self::Vector3(track) => track.end_time(),
            Self::Quaternion(track) => track.end_time(),
            Self::Scalar(track) => track.end_time(),
            Self::MorphWeights(track) => track.end_time(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Vector3(track) => track.is_empty(),
            Self::Quaternion(track) => track.is_empty(),
            Self::Scalar(track) => track.is_empty(),
            Self::MorphWeights(track) => track.is_empty(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Vector3(_) => Vec3::TYPE_NAME,
            Self::Quaternion(_) => Quat::TYPE_NAME,
            Self::Scalar(_) => f32::TYPE_NAME,
            Self::MorphWeights(_) => MorphWeightData::TYPE_NAME,
        }
    }

    fn drives(&self, target: TargetPath) -> bool {
        matches!(
            (self, target),
            (Self::Vector3(_), TargetPath::Translation | TargetPath::Scale)
                | (Self::Quaternion(_), TargetPath::Rotation)
                | (Self::Scalar(_) | Self::MorphWeights(_), TargetPath::Weights)
        )
    }

    /// Samples the track at `time` using the channel's cursor.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> TrackValue {
        match self {
            Self::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(time, cursor)),
            Self::Quaternion(t) => TrackValue::Quaternion(t.sample_with_cursor(time, cursor)),
            Self::Scalar(t) => TrackValue::Scalar(t.sample_with_cursor(time, cursor)),
            Self::MorphWeights(t) => TrackValue::MorphWeights(t.sample_with_cursor(time, cursor)),
        }
    }

    #[must_use]
    pub fn sample(&self, time: f32) -> TrackValue {
        match self {
            Self::Vector3(t) => TrackValue::Vector3(t.sample(time)),
            Self::Quaternion(t) => TrackValue::Quaternion(t.sample(time)),
            Self::Scalar(t) => TrackValue::Scalar(t.sample(time)),
            Self::MorphWeights(t) => TrackValue::MorphWeights(t.sample(time)),
        }
    }
}

/// A sampled channel value.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
    Scalar(f32),
    MorphWeights(MorphWeightData),
}

/// One animated property of one node.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    pub node: NodeId,
    pub target: TargetPath,
    pub data: TrackData,
}

impl AnimationChannel {
    #[must_use]
    pub fn new(node: NodeId, target: TargetPath, data: TrackData) -> Self {
        Self { node, target, data }
    }
}

/// An immutable set of channels. The duration is the latest keyframe time
/// across all channels.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    /// Builds a clip, rejecting channels whose data cannot drive their target.
    pub fn new(name: impl Into<String>, channels: Vec<AnimationChannel>) -> Result<Self> {
        let name = name.into();

        for (index, channel) in channels.iter().enumerate() {
            if !channel.data.drives(channel.target) {
                return Err(AnimationError::ChannelTypeMismatch {
                    clip: name,
                    channel: index,
                    target: channel.target,
                    found: channel.data.type_name(),
                });
            }
        }

        let duration = channels
            .iter()
            .map(|c| c.data.end_time())
            .fold(0.0_f32, f32::max);

        Ok(Self {
            name,
            duration,
            channels,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }
}
