//! Error Types
//!
//! This module defines the error types returned while building animation
//! assets and models.
//!
//! # Overview
//!
//! [`AnimationError`] only covers *load-time* structural failures:
//! - Malformed keyframe tracks (length mismatches, unordered times)
//! - Channels whose data type does not fit the animated property
//! - Skins that exceed the joint budget or reference unknown nodes
//! - Inconsistent scene hierarchies
//!
//! Per-frame anomalies (a channel targeting a node that is not in the graph,
//! several unweighted clips fighting over one property) are *not* errors.
//! They are reported through the `log` facade and the frame keeps going.
//!
//! # Usage
//!
//! ```rust,ignore
//! use myth_animation::errors::{AnimationError, Result};
//!
//! fn load() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::animation::binding::TargetPath;

/// The main error type for the animation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    // ========================================================================
    // Track & Clip Errors
    // ========================================================================
    /// Keyframe data is structurally invalid.
    #[error("Malformed track: {reason}")]
    MalformedTrack {
        /// What is wrong with the track
        reason: String,
    },

    /// The track's value type cannot drive the targeted property.
    #[error("Channel {channel} of clip '{clip}' targets {target:?} with {found} data")]
    ChannelTypeMismatch {
        /// Clip name
        clip: String,
        /// Channel index within the clip
        channel: usize,
        /// Targeted property
        target: TargetPath,
        /// Name of the data type actually stored
        found: &'static str,
    },

    // ========================================================================
    // Skinning Errors
    // ========================================================================
    /// A skin has more joints than the fixed joint buffer can hold.
    #[error("Joint budget exceeded: skin '{skin}' has {joints} joints, budget is {budget}")]
    JointBudgetExceeded {
        /// Skin name
        skin: String,
        /// Number of joints requested
        joints: usize,
        /// Capacity of the joint buffer
        budget: usize,
    },

    /// A skin references data that does not line up.
    #[error("Invalid skin '{skin}': {reason}")]
    InvalidSkin {
        /// Skin name
        skin: String,
        /// What is wrong with the skin
        reason: String,
    },

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// Parent/child links of the scene graph are inconsistent.
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// No clip with the given name was registered.
    #[error("Unknown clip: {0}")]
    UnknownClip(String),
}

impl AnimationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedTrack {
            reason: reason.into(),
        }
    }
}

/// Alias for `Result<T, AnimationError>`.
pub type Result<T> = std::result::Result<T, AnimationError>;
