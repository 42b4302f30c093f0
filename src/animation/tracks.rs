use crate::animation::values::Interpolatable;
use crate::errors::{AnimationError, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval used by a channel so that
/// sequential playback can find the next one without a binary search.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Typed keyframe samples of one channel.
///
/// Validated on construction: `times` is finite and never decreases,
/// `values` has one entry per time, and cubic tracks carry one in/out tangent
/// per keyframe. Adjacent keyframes may share a timestamp; sampling such a
/// zero-length interval yields its left value.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    // Only populated for `InterpolationMode::CubicSpline`.
    in_tangents: Vec<T>,
    out_tangents: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Creates a `Step` or `Linear` track.
    ///
    /// Cubic tracks need tangents; build them with [`Self::cubic`] or
    /// [`Self::from_packed`].
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Result<Self> {
        if interpolation == InterpolationMode::CubicSpline {
            return Err(AnimationError::malformed(
                "cubic spline track created without tangents",
            ));
        }
        Self::validated(times, values, Vec::new(), Vec::new(), interpolation)
    }

    /// Creates a `CubicSpline` track with explicit per-keyframe tangents.
    pub fn cubic(
        times: Vec<f32>,
        values: Vec<T>,
        in_tangents: Vec<T>,
        out_tangents: Vec<T>,
    ) -> Result<Self> {
        Self::validated(
            times,
            values,
            in_tangents,
            out_tangents,
            InterpolationMode::CubicSpline,
        )
    }

    /// Creates a track from sampler output as laid out by glTF.
    ///
    /// For `CubicSpline`, `packed` holds `[in_tangent, value, out_tangent]`
    /// for every keyframe; otherwise it holds the values directly.
    pub fn from_packed(times: Vec<f32>, packed: Vec<T>, interpolation: InterpolationMode) -> Result<Self> {
        if interpolation != InterpolationMode::CubicSpline {
            return Self::new(times, packed, interpolation);
        }

        if packed.len() != times.len() * 3 {
            return Err(AnimationError::malformed(format!(
                "cubic spline output has {} elements, expected 3 x {} keyframes",
                packed.len(),
                times.len()
            )));
        }

        let count = times.len();
        let mut in_tangents = Vec::with_capacity(count);
        let mut values = Vec::with_capacity(count);
        let mut out_tangents = Vec::with_capacity(count);
        for triple in packed.chunks_exact(3) {
            in_tangents.push(triple[0].clone());
            values.push(triple[1].clone());
            out_tangents.push(triple[2].clone());
        }

        Self::cubic(times, values, in_tangents, out_tangents)
    }

    fn validated(
        times: Vec<f32>,
        values: Vec<T>,
        in_tangents: Vec<T>,
        out_tangents: Vec<T>,
        interpolation: InterpolationMode,
    ) -> Result<Self> {
        if values.len() != times.len() {
            return Err(AnimationError::malformed(format!(
                "{} {} values for {} keyframe times",
                values.len(),
                T::TYPE_NAME,
                times.len()
            )));
        }

        if let Some(i) = times.iter().position(|t| !t.is_finite()) {
            return Err(AnimationError::malformed(format!(
                "keyframe time {i} is not finite"
            )));
        }

        if let Some(i) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(AnimationError::malformed(format!(
                "keyframe times are not ascending at index {} ({} after {})",
                i + 1,
                times[i + 1],
                times[i]
            )));
        }

        if interpolation == InterpolationMode::CubicSpline
            && (in_tangents.len() != values.len() || out_tangents.len() != values.len())
        {
            return Err(AnimationError::malformed(format!(
                "cubic spline track has {} in / {} out tangents for {} values",
                in_tangents.len(),
                out_tangents.len(),
                values.len()
            )));
        }

        Ok(Self {
            times,
            values,
            in_tangents,
            out_tangents,
            interpolation,
        })
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe, `0.0` for an empty track.
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling: binary search for the bracketing keyframes.
    ///
    /// Times outside the keyframe range clamp to the first/last value.
    /// An empty track yields `T::default()`.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        if self.times.len() <= 1 {
            return self.constant_value();
        }
        self.sample_at_frame(self.locate(time), time)
    }

    /// Sampling with a cursor hint.
    ///
    /// Scans a few intervals around the cursor first (forward for normal
    /// playback, backward for reverse playback) and falls back to
    /// [`Self::sample`]'s binary search on larger jumps. The cursor is
    /// updated to the interval that was used.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        if len <= 1 {
            return self.constant_value();
        }

        let hint = cursor.last_index.min(len - 1);
        let index = self.scan_from(hint, time).unwrap_or_else(|| self.locate(time));

        cursor.last_index = index;
        self.sample_at_frame(index, time)
    }

    /// Index of the last keyframe at or before `time`, clamped to `0`.
    #[inline]
    fn locate(&self, time: f32) -> usize {
        self.times.partition_point(|&t| t <= time).saturating_sub(1)
    }

    fn scan_from(&self, hint: usize, time: f32) -> Option<usize> {
        let last = self.times.len() - 1;

        if time >= self.times[hint] {
            // Forward: first interval whose right edge lies beyond `time`.
            for idx in hint..=(hint + MAX_SCAN_OFFSET).min(last) {
                if idx == last || time < self.times[idx + 1] {
                    return Some(idx);
                }
            }
        } else {
            // Backward: first keyframe at or before `time`.
            for offset in 1..=MAX_SCAN_OFFSET {
                let idx = hint.checked_sub(offset)?;
                if idx == 0 || time >= self.times[idx] {
                    return Some(idx);
                }
            }
        }

        None
    }

    fn constant_value(&self) -> T {
        self.values.first().cloned().unwrap_or_default()
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let last = self.times.len() - 1;

        if index >= last {
            return self.values[last].clone();
        }

        let next = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next] - t0;

        if dt <= 0.0 {
            return self.values[index].clone();
        }

        let t = ((time - t0) / dt).clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.values[index].clone(),
            InterpolationMode::Linear => {
                T::interpolate_linear(&self.values[index], &self.values[next], t)
            }
            InterpolationMode::CubicSpline => T::interpolate_cubic(
                &self.values[index],
                &self.out_tangents[index],
                &self.in_tangents[next],
                &self.values[next],
                t,
                dt,
            ),
        }
    }
}
