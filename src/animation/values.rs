use glam::{Quat, Vec3, Vec4};
use smallvec::SmallVec;

/// Morph target counts up to this size are stored inline without heap allocation.
pub const INLINE_MORPH_TARGETS: usize = 8;

/// A value type that a [`KeyframeTrack`](super::tracks::KeyframeTrack) can hold.
pub trait Interpolatable: Clone + Default {
    /// Human readable type name, used in load-time diagnostics.
    const TYPE_NAME: &'static str;

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    /// Hermite interpolation between `v0` and `v1`.
    ///
    /// Tangents are given per unit time and are scaled by the keyframe
    /// interval `dt` here.
    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self;
}

/// Cubic Hermite basis `(h00, h10, h01, h11)` at parameter `t`.
#[inline]
#[must_use]
pub fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    (h00, h10, h01, h11)
}

/// Per-keyframe morph target weights.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MorphWeightData {
    pub weights: SmallVec<[f32; INLINE_MORPH_TARGETS]>,
}

impl MorphWeightData {
    /// Zeroed weights for `count` morph targets.
    #[must_use]
    pub fn allocate(count: usize) -> Self {
        Self {
            weights: SmallVec::from_elem(0.0, count),
        }
    }

    #[must_use]
    pub fn from_slice(weights: &[f32]) -> Self {
        Self {
            weights: SmallVec::from_slice(weights),
        }
    }

    /// Splits a flat `[frame0_w0, frame0_w1, .., frame1_w0, ..]` buffer into
    /// one entry per frame.
    #[must_use]
    pub fn chunked(flat: &[f32], targets_per_frame: usize) -> Vec<Self> {
        if targets_per_frame == 0 {
            return Vec::new();
        }
        flat.chunks_exact(targets_per_frame)
            .map(Self::from_slice)
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Interpolatable for MorphWeightData {
    const TYPE_NAME: &'static str = "morph weights";

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        let weights = start
            .weights
            .iter()
            .zip(&end.weights)
            .map(|(a, b)| a + (b - a) * t)
            .collect();
        Self { weights }
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let weights = v0
            .weights
            .iter()
            .enumerate()
            .map(|(i, &p0)| {
                let m0 = out_tangent0.weights.get(i).copied().unwrap_or(0.0);
                let m1 = in_tangent1.weights.get(i).copied().unwrap_or(0.0);
                let p1 = v1.weights.get(i).copied().unwrap_or(p0);
                f32::interpolate_cubic(&p0, &m0, &m1, &p1, t, dt)
            })
            .collect();
        Self { weights }
    }
}

impl Interpolatable for f32 {
    const TYPE_NAME: &'static str = "scalar";

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(t);
        v0 * h00 + out_tangent0 * h10 * dt + v1 * h01 + in_tangent1 * h11 * dt
    }
}

impl Interpolatable for Vec3 {
    const TYPE_NAME: &'static str = "vec3";

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(*end, t)
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(t);
        *v0 * h00 + *out_tangent0 * (h10 * dt) + *v1 * h01 + *in_tangent1 * (h11 * dt)
    }
}

impl Interpolatable for Quat {
    const TYPE_NAME: &'static str = "quaternion";

    /// Spherical interpolation along the shorter arc.
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        let end = if start.dot(*end) < 0.0 { -*end } else { *end };
        start.slerp(end, t).normalize()
    }

    /// Component-wise Hermite over `(x, y, z, w)` followed by renormalization.
    ///
    /// Not a spherical spline: results match the glTF sample viewer, which
    /// interpolates quaternion splines the same way.
    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(t);

        let p0 = Vec4::from(*v0);
        let p1 = Vec4::from(*v1);
        let m0 = Vec4::from(*out_tangent0) * dt;
        let m1 = Vec4::from(*in_tangent1) * dt;

        let result = p0 * h00 + m0 * h10 + p1 * h01 + m1 * h11;

        // A degenerate spline can pass through the origin; hold the left key.
        let unit = result.try_normalize().unwrap_or_else(|| p0.normalize());
        Quat::from_vec4(unit)
    }
}
