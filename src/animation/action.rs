use std::sync::Arc;

use log::debug;

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackValue},
    tracks::KeyframeCursor,
};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    /// Play through once, then finish.
    Once,
    /// Play `n` full loops, then finish. `Count(0)` is finished immediately.
    Count(u32),
    /// Loop until stopped.
    Forever,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Finished,
}

/// Runtime playback state of one clip instance.
///
/// The sampled position is `elapsed + time_offset`, folded into the clip
/// according to the repeat mode.
#[derive(Debug, Clone)]
pub struct ActiveAnimation {
    clip: Arc<AnimationClip>,
    bindings: Arc<[PropertyBinding]>,

    elapsed: f32,
    weight: Option<f32>,
    state: PlaybackState,

    pub time_offset: f32,
    pub time_scale: f32,
    pub repeat: RepeatMode,
    pub paused: bool,
    /// Keep contributing the last frame after finishing instead of dropping
    /// out of the pose.
    pub hold_at_end: bool,

    // One cursor per binding.
    pub(crate) cursors: Vec<KeyframeCursor>,
}

impl ActiveAnimation {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, bindings: Arc<[PropertyBinding]>, repeat: RepeatMode) -> Self {
        let state = if repeat == RepeatMode::Count(0) {
            PlaybackState::Finished
        } else {
            PlaybackState::Playing
        };

        Self {
            cursors: vec![KeyframeCursor::default(); bindings.len()],
            clip,
            bindings,
            elapsed: 0.0,
            weight: None,
            state,
            time_offset: 0.0,
            time_scale: 1.0,
            repeat,
            paused: false,
            hold_at_end: false,
        }
    }

    /// Sets the blend weight. Negative or NaN weights are stored as `0.0`.
    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.set_weight(Some(weight));
        self
    }

    #[must_use]
    pub fn with_time_offset(mut self, time_offset: f32) -> Self {
        self.time_offset = time_offset;
        self
    }

    #[must_use]
    pub fn holding_at_end(mut self) -> Self {
        self.hold_at_end = true;
        self
    }

    /// Starts the playback position at `elapsed` instead of zero.
    #[must_use]
    pub fn starting_at(mut self, elapsed: f32) -> Self {
        self.elapsed = elapsed;
        self.refresh_state();
        self
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// `None` for unweighted playback (direct overwrite, last wins).
    #[inline]
    #[must_use]
    pub fn weight(&self) -> Option<f32> {
        self.weight
    }

    pub fn set_weight(&mut self, weight: Option<f32>) {
        self.weight = weight.map(|w| if w > 0.0 { w } else { 0.0 });
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    /// Advances the playback position.
    pub fn update(&mut self, dt: f32) {
        if self.paused || self.is_finished() || !dt.is_finite() {
            return;
        }

        self.elapsed += dt * self.time_scale;
        self.refresh_state();
    }

    fn refresh_state(&mut self) {
        let duration = self.clip.duration();
        let position = self.elapsed + self.time_offset;

        let finished = match self.repeat {
            RepeatMode::Once => position >= duration,
            RepeatMode::Count(n) => position >= duration * n as f32,
            RepeatMode::Forever => {
                if duration > 0.0 {
                    // Keep `elapsed` bounded; the offset is constant so the
                    // folded position is unchanged.
                    self.elapsed = self.elapsed.rem_euclid(duration);
                } else {
                    self.elapsed = 0.0;
                }
                false
            }
        };

        if finished && self.state == PlaybackState::Playing {
            debug!("Animation '{}' finished", self.clip.name());
            self.state = PlaybackState::Finished;
        }
    }

    /// Position inside the clip at which channels are sampled.
    #[must_use]
    pub fn local_time(&self) -> f32 {
        let duration = self.clip.duration();
        if duration <= 0.0 {
            return 0.0;
        }

        let position = self.elapsed + self.time_offset;
        match self.repeat {
            _ if self.is_finished() => duration,
            RepeatMode::Once => position.clamp(0.0, duration),
            RepeatMode::Count(_) => position.max(0.0) % duration,
            RepeatMode::Forever => position.rem_euclid(duration),
        }
    }

    /// Samples every bound channel at [`Self::local_time`], advancing the
    /// per-channel cursors.
    pub fn sample_channels(&mut self, mut f: impl FnMut(&PropertyBinding, TrackValue)) {
        let time = self.local_time();
        let channels = self.clip.channels();

        for (binding, cursor) in self.bindings.iter().zip(&mut self.cursors) {
            if let Some(channel) = channels.get(binding.channel_index) {
                f(binding, channel.data.sample_with_cursor(time, cursor));
            }
        }
    }
}
