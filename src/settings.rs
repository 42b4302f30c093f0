//! Animation Settings
//!
//! Per-model configuration for the animation core.
//!
//! ```rust,ignore
//! use myth_animation::AnimationSettings;
//!
//! // Default: 100 joint slots, conflict diagnostics on
//! let settings = AnimationSettings::default();
//!
//! // A renderer whose skinning uniform only has room for 64 joints
//! let settings = AnimationSettings::default().with_joint_budget(64);
//! ```

/// Default capacity of a [`JointMatrixBuffer`](crate::scene::skeleton::JointMatrixBuffer).
///
/// Matches the size of the joint uniform array consumed by the skinning shader.
pub const MAX_JOINTS: usize = 100;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    /// Number of joint slots available per skin. Skins with more joints are
    /// rejected when the model is built.
    pub joint_budget: usize,

    /// Emit a warning when several unweighted clips write the same
    /// node property in one frame.
    pub warn_on_blend_conflict: bool,

    /// Global playback speed applied to every `update` call.
    pub time_scale: f32,
}

impl Default for AnimationSettings {
    #[inline]
    fn default() -> Self {
        Self {
            joint_budget: MAX_JOINTS,
            warn_on_blend_conflict: true,
            time_scale: 1.0,
        }
    }
}

impl AnimationSettings {
    #[must_use]
    pub fn with_joint_budget(mut self, joint_budget: usize) -> Self {
        self.joint_budget = joint_budget;
        self
    }

    #[must_use]
    pub fn with_conflict_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_blend_conflict = enabled;
        self
    }

    #[must_use]
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
