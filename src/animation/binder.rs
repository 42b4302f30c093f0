use log::warn;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::SceneGraph;

pub struct Binder;

impl Binder {
    /// Resolves the clip's channels against the scene graph.
    ///
    /// Channels whose target node is not part of the graph, and channels
    /// without keyframes, produce no binding and therefore never touch the
    /// pose.
    #[must_use]
    pub fn bind(graph: &SceneGraph, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.channels().len());

        for (channel_index, channel) in clip.channels().iter().enumerate() {
            if !graph.contains(channel.node) {
                warn!(
                    "Clip '{}': channel {channel_index} targets missing node {:?}, skipped",
                    clip.name(),
                    channel.node
                );
                continue;
            }

            if channel.data.is_empty() {
                continue;
            }

            bindings.push(PropertyBinding {
                channel_index,
                node: channel.node,
                target: channel.target,
            });
        }

        bindings
    }
}
