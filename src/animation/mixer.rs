use std::sync::Arc;

use log::debug;
use slotmap::{SlotMap, new_key_type};

use crate::animation::action::{ActiveAnimation, RepeatMode};
use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;

new_key_type! {
    /// Handle to a playing clip instance. Stays invalid after the instance
    /// is removed, even if its slot is reused.
    pub struct ActionHandle;
}

/// One entry of a weighted multi-clip blend.
#[derive(Debug, Clone)]
pub struct WeightedEntry {
    pub clip: Arc<AnimationClip>,
    pub bindings: Arc<[PropertyBinding]>,
    pub weight: f32,
    /// Added to the shared base time before sampling.
    pub time_offset: f32,
    /// `0.0` loops the clip. A positive value is the base time at which a
    /// one-shot starts; the clip then holds its last frame instead of looping.
    pub start: f32,
}

/// Ordered list of active clip instances owned by one model.
///
/// List order is the evaluation order: for unweighted instances fighting
/// over the same property, the later one wins.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: SlotMap<ActionHandle, ActiveAnimation>,
    order: Vec<ActionHandle>,
    // f64 so the base time stays accurate over long sessions.
    clock: f64,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base time shared by weighted entries: total time advanced so far.
    #[inline]
    #[must_use]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn add_action(&mut self, action: ActiveAnimation) -> ActionHandle {
        debug!(
            "Playing '{}' ({:?}, weight {:?})",
            action.clip().name(),
            action.repeat,
            action.weight()
        );
        let handle = self.actions.insert(action);
        self.order.push(handle);
        handle
    }

    /// Starts unweighted playback of a clip.
    pub fn play(
        &mut self,
        clip: Arc<AnimationClip>,
        bindings: Arc<[PropertyBinding]>,
        repeat: RepeatMode,
    ) -> ActionHandle {
        self.add_action(ActiveAnimation::new(clip, bindings, repeat))
    }

    /// Starts a group of weighted instances sampled against the mixer clock.
    pub fn play_weighted<I>(&mut self, entries: I) -> Vec<ActionHandle>
    where
        I: IntoIterator<Item = WeightedEntry>,
    {
        entries
            .into_iter()
            .map(|entry| {
                let one_shot = entry.start > 0.0;
                let elapsed = if one_shot {
                    self.clock - f64::from(entry.start)
                } else {
                    // Fold before narrowing so a large clock keeps its phase.
                    let duration = f64::from(entry.clip.duration());
                    if duration > 0.0 { self.clock.rem_euclid(duration) } else { 0.0 }
                };

                let repeat = if one_shot { RepeatMode::Once } else { RepeatMode::Forever };
                let mut action = ActiveAnimation::new(entry.clip, entry.bindings, repeat)
                    .with_weight(entry.weight)
                    .with_time_offset(entry.time_offset);
                if one_shot {
                    action = action.holding_at_end();
                }
                self.add_action(action.starting_at(elapsed as f32))
            })
            .collect()
    }

    /// Removes one instance. Returns `false` for a stale handle.
    pub fn stop(&mut self, handle: ActionHandle) -> bool {
        if self.actions.remove(handle).is_none() {
            return false;
        }
        self.order.retain(|&h| h != handle);
        true
    }

    pub fn stop_all(&mut self) {
        debug!("Stopping {} animations", self.order.len());
        self.actions.clear();
        self.order.clear();
    }

    /// Drops every finished instance.
    pub fn remove_finished(&mut self) {
        let actions = &mut self.actions;
        self.order.retain(|&handle| {
            let finished = actions.get(handle).is_none_or(ActiveAnimation::is_finished);
            if finished {
                actions.remove(handle);
            }
            !finished
        });
    }

    /// A removed (or never valid) handle counts as finished.
    #[must_use]
    pub fn is_finished(&self, handle: ActionHandle) -> bool {
        self.actions.get(handle).is_none_or(ActiveAnimation::is_finished)
    }

    #[must_use]
    pub fn get(&self, handle: ActionHandle) -> Option<&ActiveAnimation> {
        self.actions.get(handle)
    }

    pub fn get_mut(&mut self, handle: ActionHandle) -> Option<&mut ActiveAnimation> {
        self.actions.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Handles in evaluation order.
    #[inline]
    #[must_use]
    pub fn handles(&self) -> &[ActionHandle] {
        &self.order
    }

    /// Advances the clock and every instance. Finished instances stay in the
    /// list until removed.
    pub fn update(&mut self, dt: f32) {
        if !dt.is_finite() {
            return;
        }

        self.clock += f64::from(dt);
        for action in self.actions.values_mut() {
            action.update(dt);
        }
    }

    /// Visits instances in list order with mutable access (cursors are
    /// advanced while sampling).
    pub fn for_each_in_order(&mut self, mut f: impl FnMut(&mut ActiveAnimation)) {
        for &handle in &self.order {
            if let Some(action) = self.actions.get_mut(handle) {
                f(action);
            }
        }
    }
}
