//! Pose resolution: samples every active clip and merges the results into a
//! [`NodeTransformTable`].
//!
//! Merge rules per node property:
//! - Unweighted instances overwrite the property directly. When several
//!   instances hit the same property in one frame the last one in list order
//!   wins and a conflict is reported (once per node/property). Two channels
//!   of one clip on the same property are not a conflict.
//! - Finished instances are skipped, except one-shots that hold their last
//!   frame.
//! - Weighted instances accumulate `value * weight`; the sum is divided by
//!   the total weight of the instances that actually touched that property,
//!   so clips animating other nodes do not dilute it.
//! - Rotations accumulate as a plain component-wise weighted sum and are
//!   renormalized afterwards. This is linear quaternion blending, close to
//!   slerp for the small angular differences between blended locomotion poses.
//!   Inputs are not sign-aligned, so clips are expected to author rotations in
//!   a consistent hemisphere.
//! - An unweighted write takes precedence over weighted ones on the same
//!   property.

use glam::{Quat, Vec3, Vec4};
use log::{trace, warn};
use rustc_hash::FxHashSet;

use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::TrackValue;
use crate::animation::mixer::AnimationMixer;
use crate::animation::values::MorphWeightData;
use crate::scene::{NodeId, NodeTransformTable, SceneGraph};

#[derive(Debug, Clone, Default)]
struct NodeAccumulator {
    translation: Vec3,
    rotation: Vec4,
    scale: Vec3,
    weights: MorphWeightData,
    weight_sums: [f32; TargetPath::COUNT],
    // Instance (by evaluation order) that last overwrote each property.
    writers: [Option<usize>; TargetPath::COUNT],
}

impl NodeAccumulator {
    fn clear(&mut self) {
        self.translation = Vec3::ZERO;
        self.rotation = Vec4::ZERO;
        self.scale = Vec3::ZERO;
        self.weights.weights.clear();
        self.weight_sums = [0.0; TargetPath::COUNT];
        self.writers = [None; TargetPath::COUNT];
    }
}

#[derive(Debug)]
pub struct WeightedBlender {
    accumulators: Vec<NodeAccumulator>,
    reported_conflicts: FxHashSet<(NodeId, TargetPath)>,
    warn_on_conflict: bool,
}

impl Default for WeightedBlender {
    fn default() -> Self {
        Self::new(true)
    }
}

impl WeightedBlender {
    #[must_use]
    pub fn new(warn_on_conflict: bool) -> Self {
        Self {
            accumulators: Vec::new(),
            reported_conflicts: FxHashSet::default(),
            warn_on_conflict,
        }
    }

    /// Pre-sizes the per-node accumulators.
    #[must_use]
    pub fn with_capacity(node_count: usize, warn_on_conflict: bool) -> Self {
        let mut blender = Self::new(warn_on_conflict);
        blender.accumulators.resize_with(node_count, NodeAccumulator::default);
        blender
    }

    /// Node/property pairs that have seen an unweighted conflict so far.
    #[must_use]
    pub fn reported_conflicts(&self) -> &FxHashSet<(NodeId, TargetPath)> {
        &self.reported_conflicts
    }

    /// Resets `pose` to the authored defaults and applies every playing
    /// instance of `mixer`, in list order. Instances with zero weight are
    /// skipped, and so are finished ones unless they hold their last frame.
    ///
    /// Only local transforms are written; world matrices are composed
    /// afterwards by the transform system.
    pub fn resolve_local_pose(
        &mut self,
        mixer: &mut AnimationMixer,
        graph: &SceneGraph,
        pose: &mut NodeTransformTable,
    ) {
        pose.reset(graph);

        if self.accumulators.len() != graph.len() {
            self.accumulators.resize_with(graph.len(), NodeAccumulator::default);
        }
        for acc in &mut self.accumulators {
            acc.clear();
        }

        let mut contributors = 0usize;
        mixer.for_each_in_order(|action| {
            if action.is_finished() && !action.hold_at_end {
                return;
            }

            let weight = action.weight();
            if weight.is_some_and(|w| w <= 0.0) {
                return;
            }

            let instance = contributors;
            contributors += 1;
            action.sample_channels(|binding, value| match weight {
                None => self.overwrite(instance, binding, value, pose),
                Some(w) => self.accumulate(binding, value, w),
            });
        });

        self.finish(pose);

        trace!("Resolved pose from {contributors} active animations");
    }

    fn overwrite(
        &mut self,
        instance: usize,
        binding: &PropertyBinding,
        value: TrackValue,
        pose: &mut NodeTransformTable,
    ) {
        let Some(acc) = self.accumulators.get_mut(binding.node.index()) else {
            return;
        };

        let slot = binding.target.slot();
        let previous = acc.writers[slot].replace(instance);
        let conflict = previous.is_some_and(|writer| writer != instance);

        if conflict {
            self.report_conflict(binding.node, binding.target);
        }

        match (binding.target, value) {
            (TargetPath::Translation, TrackValue::Vector3(v)) => {
                if let Some(local) = pose.local_mut(binding.node) {
                    local.position = v;
                }
            }
            (TargetPath::Scale, TrackValue::Vector3(v)) => {
                if let Some(local) = pose.local_mut(binding.node) {
                    local.scale = v;
                }
            }
            (TargetPath::Rotation, TrackValue::Quaternion(q)) => {
                if let Some(local) = pose.local_mut(binding.node) {
                    local.rotation = unit_or(Vec4::from(q), local.rotation);
                }
            }
            (TargetPath::Weights, TrackValue::MorphWeights(w)) => {
                if let Some(target) = pose.morph_weights_mut(binding.node) {
                    *target = w;
                }
            }
            (TargetPath::Weights, TrackValue::Scalar(s)) => {
                if let Some(target) = pose.morph_weights_mut(binding.node) {
                    match target.weights.first_mut() {
                        Some(first) => *first = s,
                        None => target.weights.push(s),
                    }
                }
            }
            // Channel types are checked when the clip is built.
            _ => {}
        }
    }

    fn accumulate(&mut self, binding: &PropertyBinding, value: TrackValue, weight: f32) {
        let Some(acc) = self.accumulators.get_mut(binding.node.index()) else {
            return;
        };

        acc.weight_sums[binding.target.slot()] += weight;

        match (binding.target, value) {
            (TargetPath::Translation, TrackValue::Vector3(v)) => acc.translation += v * weight,
            (TargetPath::Scale, TrackValue::Vector3(v)) => acc.scale += v * weight,
            (TargetPath::Rotation, TrackValue::Quaternion(q)) => {
                acc.rotation += Vec4::from(q) * weight;
            }
            (TargetPath::Weights, TrackValue::MorphWeights(w)) => {
                if acc.weights.len() < w.len() {
                    acc.weights.weights.resize(w.len(), 0.0);
                }
                for (sum, value) in acc.weights.weights.iter_mut().zip(&w.weights) {
                    *sum += value * weight;
                }
            }
            (TargetPath::Weights, TrackValue::Scalar(s)) => {
                if acc.weights.is_empty() {
                    acc.weights.weights.push(0.0);
                }
                acc.weights.weights[0] += s * weight;
            }
            _ => {}
        }
    }

    fn finish(&self, pose: &mut NodeTransformTable) {
        for (index, acc) in self.accumulators.iter().enumerate() {
            let id = NodeId(index);
            let blended = |target: TargetPath| {
                let slot = target.slot();
                (acc.weight_sums[slot] > 0.0 && acc.writers[slot].is_none()).then_some(acc.weight_sums[slot])
            };

            if let Some(local) = pose.local_mut(id) {
                if let Some(total) = blended(TargetPath::Translation) {
                    local.position = acc.translation / total;
                }
                if let Some(total) = blended(TargetPath::Rotation) {
                    local.rotation = unit_or(acc.rotation / total, local.rotation);
                }
                if let Some(total) = blended(TargetPath::Scale) {
                    local.scale = acc.scale / total;
                }
            }

            if let Some(total) = blended(TargetPath::Weights) {
                if let Some(target) = pose.morph_weights_mut(id) {
                    target.weights.clone_from(&acc.weights.weights);
                    for w in &mut target.weights {
                        *w /= total;
                    }
                }
            }
        }
    }

    fn report_conflict(&mut self, node: NodeId, target: TargetPath) {
        if self.reported_conflicts.insert((node, target)) && self.warn_on_conflict {
            warn!(
                "Blend conflict: several unweighted animations drive {target:?} of {node:?}; the last one wins"
            );
        }
    }
}

/// Normalizes `v` as a quaternion, keeping `fallback` for a zero-length sum.
fn unit_or(v: Vec4, fallback: Quat) -> Quat {
    v.try_normalize().map_or(fallback, Quat::from_vec4)
}
