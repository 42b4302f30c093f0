//! Animated Model
//!
//! The per-model control surface: owns the scene graph, the clip library,
//! the skins and one [`AnimationMixer`], and produces the renderer-facing
//! pose once per frame.
//!
//! # Frame flow
//!
//! ```text
//! update(dt)
//!   ├─ mixer.update(dt)                 advance every instance
//!   ├─ blender.resolve_local_pose(..)   reset + sample + merge local TRS
//!   ├─ update_hierarchy(..)             compose world matrices
//!   └─ compute_joint_matrices(..)       one buffer per skin
//! ```
//!
//! Each stage completes before the next starts, and all buffers are sized
//! when the model is built.
//!
//! ```rust,ignore
//! let mut model = AnimatedModel::new(graph, clips, skins, AnimationSettings::default())?;
//! let walk = model.play_by_name("Walk", RepeatMode::Forever)?;
//!
//! // every frame
//! model.update(dt);
//! for node in drawables {
//!     match model.draw_transform(node) {
//!         Some(DrawTransform::Rigid(matrix)) => { /* model uniform */ }
//!         Some(DrawTransform::Skinned { joints, .. }) => { /* joint uniform */ }
//!         None => {}
//!     }
//! }
//! ```

use std::sync::Arc;

use glam::Mat4;
use log::{error, warn};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::animation::action::{ActiveAnimation, RepeatMode};
use crate::animation::binder::Binder;
use crate::animation::binding::PropertyBinding;
use crate::animation::blend::WeightedBlender;
use crate::animation::clip::AnimationClip;
use crate::animation::mixer::{ActionHandle, AnimationMixer, WeightedEntry};
use crate::errors::{AnimationError, Result};
use crate::scene::skeleton::compute_joint_matrices;
use crate::scene::transform_system::{HierarchyStack, update_hierarchy};
use crate::scene::{JointMatrixBuffer, NodeId, NodeTransformTable, SceneGraph, Skin};
use crate::settings::AnimationSettings;

new_key_type! {
    pub struct ClipKey;
}

#[derive(Debug)]
struct BoundClip {
    clip: Arc<AnimationClip>,
    bindings: Arc<[PropertyBinding]>,
}

/// A weighted blend request, see [`AnimatedModel::play_weighted`].
#[derive(Debug, Clone, Copy)]
pub struct WeightedClip {
    pub clip: ClipKey,
    pub weight: f32,
    pub time_offset: f32,
    /// `0.0` loops; a positive value plays once from that base time and then
    /// holds the last frame.
    pub start: f32,
}

impl WeightedClip {
    /// A looping entry without offset.
    #[must_use]
    pub fn new(clip: ClipKey, weight: f32) -> Self {
        Self {
            clip,
            weight,
            time_offset: 0.0,
            start: 0.0,
        }
    }
}

/// How the renderer should place a node this frame.
#[derive(Debug, Clone, Copy)]
pub enum DrawTransform<'a> {
    /// No skin: the animated world matrix is the model matrix.
    Rigid(Mat4),
    /// Skinned: vertices are placed by the skin's joint matrices.
    Skinned { skin: usize, joints: &'a [Mat4] },
}

#[derive(Debug)]
pub struct AnimatedModel {
    graph: SceneGraph,
    skins: Vec<Skin>,

    clips: SlotMap<ClipKey, BoundClip>,
    clip_names: FxHashMap<String, ClipKey>,

    mixer: AnimationMixer,
    blender: WeightedBlender,

    // === Per-frame output ===
    pose: NodeTransformTable,
    joint_buffers: Vec<JointMatrixBuffer>,
    hierarchy_stack: HierarchyStack,

    settings: AnimationSettings,
}

impl AnimatedModel {
    /// Builds a model and evaluates its authored pose.
    ///
    /// Fails when a skin exceeds `settings.joint_budget`, when a skin does not
    /// line up with the graph, or when a node refers to a skin that does not
    /// exist.
    pub fn new(
        graph: SceneGraph,
        clips: Vec<AnimationClip>,
        skins: Vec<Skin>,
        settings: AnimationSettings,
    ) -> Result<Self> {
        for skin in &skins {
            skin.validate(&graph, settings.joint_budget)?;
        }

        for (id, node) in graph.iter() {
            if let Some(skin) = node.skin.filter(|&s| s >= skins.len()) {
                return Err(AnimationError::InvalidSkin {
                    skin: format!("#{skin}"),
                    reason: format!("referenced by {id:?}, but the model has {} skins", skins.len()),
                });
            }
        }

        let joint_buffers = skins
            .iter()
            .map(|_| JointMatrixBuffer::with_capacity(settings.joint_budget))
            .collect();

        let mut model = Self {
            pose: NodeTransformTable::new(&graph),
            blender: WeightedBlender::with_capacity(graph.len(), settings.warn_on_blend_conflict),
            hierarchy_stack: HierarchyStack::with_capacity(graph.len()),
            joint_buffers,
            graph,
            skins,
            clips: SlotMap::with_key(),
            clip_names: FxHashMap::default(),
            mixer: AnimationMixer::new(),
            settings,
        };

        for clip in clips {
            model.add_clip(clip);
        }

        model.evaluate();
        Ok(model)
    }

    // ========================================================================
    // Clip library
    // ========================================================================

    /// Registers a clip and binds it to the graph.
    ///
    /// A later clip with the same name replaces the earlier one in name
    /// lookups; both stay playable through their keys.
    pub fn add_clip(&mut self, clip: AnimationClip) -> ClipKey {
        let bindings: Arc<[PropertyBinding]> = Binder::bind(&self.graph, &clip).into();
        let name = clip.name().to_string();

        let key = self.clips.insert(BoundClip {
            clip: Arc::new(clip),
            bindings,
        });

        if let Some(previous) = self.clip_names.insert(name.clone(), key) {
            warn!("Clip name '{name}' registered twice, {previous:?} is now reachable by key only");
        }
        key
    }

    #[must_use]
    pub fn clip_key(&self, name: &str) -> Option<ClipKey> {
        self.clip_names.get(name).copied()
    }

    #[must_use]
    pub fn clip(&self, key: ClipKey) -> Option<&Arc<AnimationClip>> {
        self.clips.get(key).map(|bound| &bound.clip)
    }

    pub fn clips(&self) -> impl Iterator<Item = (ClipKey, &Arc<AnimationClip>)> {
        self.clips.iter().map(|(key, bound)| (key, &bound.clip))
    }

    fn bound(&self, key: ClipKey) -> Result<&BoundClip> {
        self.clips
            .get(key)
            .ok_or_else(|| AnimationError::UnknownClip(format!("{key:?}")))
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    /// Starts unweighted playback. The new instance is appended to the
    /// active list and therefore wins conflicts against earlier ones.
    pub fn play(&mut self, clip: ClipKey, repeat: RepeatMode) -> Result<ActionHandle> {
        let bound = self.bound(clip)?;
        let (clip, bindings) = (Arc::clone(&bound.clip), Arc::clone(&bound.bindings));
        Ok(self.mixer.play(clip, bindings, repeat))
    }

    pub fn play_by_name(&mut self, name: &str, repeat: RepeatMode) -> Result<ActionHandle> {
        let key = self
            .clip_key(name)
            .ok_or_else(|| AnimationError::UnknownClip(name.to_string()))?;
        self.play(key, repeat)
    }

    /// Starts a weighted blend. Every entry samples at the shared base time
    /// plus its offset.
    ///
    /// All keys are checked before anything starts playing.
    pub fn play_weighted(&mut self, entries: &[WeightedClip]) -> Result<Vec<ActionHandle>> {
        let resolved = entries
            .iter()
            .map(|entry| {
                let bound = self.bound(entry.clip)?;
                Ok(WeightedEntry {
                    clip: Arc::clone(&bound.clip),
                    bindings: Arc::clone(&bound.bindings),
                    weight: entry.weight,
                    time_offset: entry.time_offset,
                    start: entry.start,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.mixer.play_weighted(resolved))
    }

    /// Stops one instance. Returns `false` if it was already gone.
    pub fn stop(&mut self, handle: ActionHandle) -> bool {
        self.mixer.stop(handle)
    }

    pub fn stop_all(&mut self) {
        self.mixer.stop_all();
    }

    /// Finished instances are kept (and ignored) until this is called.
    pub fn remove_finished(&mut self) {
        self.mixer.remove_finished();
    }

    #[must_use]
    pub fn is_finished(&self, handle: ActionHandle) -> bool {
        self.mixer.is_finished(handle)
    }

    #[must_use]
    pub fn animation(&self, handle: ActionHandle) -> Option<&ActiveAnimation> {
        self.mixer.get(handle)
    }

    /// Mutable access for weight, speed and pause changes.
    pub fn animation_mut(&mut self, handle: ActionHandle) -> Option<&mut ActiveAnimation> {
        self.mixer.get_mut(handle)
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    /// Exposes conflict diagnostics of the pose resolver.
    #[must_use]
    pub fn blender(&self) -> &WeightedBlender {
        &self.blender
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advances every active animation by `dt` seconds and recomputes the pose.
    pub fn update(&mut self, dt: f32) {
        self.mixer.update(dt * self.settings.time_scale);
        self.evaluate();
    }

    /// Recomputes the pose at the current playback positions.
    pub fn evaluate(&mut self) {
        self.blender
            .resolve_local_pose(&mut self.mixer, &self.graph, &mut self.pose);

        update_hierarchy(&self.graph, &mut self.pose, &mut self.hierarchy_stack);

        for (skin, buffer) in self.skins.iter().zip(&mut self.joint_buffers) {
            if let Err(err) = compute_joint_matrices(skin, &self.pose, buffer) {
                error!("{err}");
            }
        }
    }

    // ========================================================================
    // Renderer-facing output
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    #[inline]
    #[must_use]
    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    /// The resolved pose of the last evaluation.
    #[inline]
    #[must_use]
    pub fn pose(&self) -> &NodeTransformTable {
        &self.pose
    }

    /// Animated world matrix of a node.
    #[must_use]
    pub fn model_matrix(&self, node: NodeId) -> Option<Mat4> {
        self.pose.global_matrix(node)
    }

    #[must_use]
    pub fn joint_matrices(&self, skin: usize) -> Option<&JointMatrixBuffer> {
        self.joint_buffers.get(skin)
    }

    /// Rigid or skinned placement of a node, both taken from the animated pose.
    #[must_use]
    pub fn draw_transform(&self, node: NodeId) -> Option<DrawTransform<'_>> {
        let scene_node = self.graph.node(node)?;

        match scene_node.skin {
            Some(skin) => {
                let joints = self.joint_buffers.get(skin)?.as_slice();
                Some(DrawTransform::Skinned { skin, joints })
            }
            None => self.model_matrix(node).map(DrawTransform::Rigid),
        }
    }
}
