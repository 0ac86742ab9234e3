//! OverlayAnimationMixer: a base layer on mixer input 0 and an interruptible
//! one-shot overlay on input 1, crossfaded by frame-driven blend tasks.
//!
//! Lifecycle of an overlay:
//! - `play_one_shot` interrupts any current overlay, connects a fresh clip node
//!   and schedules two tasks at the same moment: the blend-in (starts now) and
//!   the blend-out (starts after `length - blend`).
//! - The blend-out's completion disconnects and destroys the clip node, then
//!   notifies listeners.
//! - Interrupting cancels both tasks, snaps weights to `{1, 0}` and removes the
//!   overlay (listeners are notified for that too).

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use layermix_graph_core::{
    AnimationTarget, BaseLayerSpec, ClipRef, FrameSample, NodeHandle, PlayableGraph,
};
use layermix_scheduler_core::{Delayed, Scheduler, TaskHandle, TaskPoll};

use crate::blend::BlendTask;
use crate::config::MixerConfig;
use crate::error::MixerError;
use crate::events::{FinishedListeners, ListenerId};

pub const BASE_INPUT: usize = 0;
pub const ONE_SHOT_INPUT: usize = 1;

/// Where the overlay currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPhase {
    Idle,
    BlendingIn,
    Holding,
    BlendingOut,
}

/// The overlay currently connected to input 1.
#[derive(Debug, Clone)]
struct ActiveOneShot {
    clip: ClipRef,
    node: NodeHandle,
    blend_duration: f32,
}

#[derive(Debug)]
pub struct OverlayAnimationMixer {
    config: MixerConfig,
    graph: PlayableGraph,
    mixer: NodeHandle,
    base: NodeHandle,
    one_shot: Option<ActiveOneShot>,
    blend_in: Option<TaskHandle>,
    blend_out: Option<TaskHandle>,
    tasks: Scheduler<Delayed<BlendTask>>,
    listeners: FinishedListeners,
}

impl OverlayAnimationMixer {
    /// Build the graph (output -> 2-input mixer, base layer on input 0 at
    /// weight 1) and start it playing.
    pub fn new(
        target: &AnimationTarget,
        base_layer: &BaseLayerSpec,
        config: MixerConfig,
    ) -> Result<Self, MixerError> {
        config.validate()?;
        let mut graph = PlayableGraph::create(&config.graph_name)?;
        // Released on any error below; nothing partial escapes.
        let built = Self::build(&mut graph, target, base_layer, &config);
        let (mixer, base) = match built {
            Ok(handles) => handles,
            Err(e) => {
                graph.destroy();
                return Err(e);
            }
        };
        debug!(
            "overlay mixer '{}' ready (target '{}', base layer '{}')",
            config.graph_name, target.name, base_layer.name
        );
        Ok(Self {
            config,
            graph,
            mixer,
            base,
            one_shot: None,
            blend_in: None,
            blend_out: None,
            tasks: Scheduler::new(),
            listeners: FinishedListeners::new(),
        })
    }

    /// Same as [`OverlayAnimationMixer::new`] with [`MixerConfig::default`].
    pub fn with_defaults(
        target: &AnimationTarget,
        base_layer: &BaseLayerSpec,
    ) -> Result<Self, MixerError> {
        Self::new(target, base_layer, MixerConfig::default())
    }

    fn build(
        graph: &mut PlayableGraph,
        target: &AnimationTarget,
        base_layer: &BaseLayerSpec,
        config: &MixerConfig,
    ) -> Result<(NodeHandle, NodeHandle), MixerError> {
        graph.create_output(&config.output_name, target)?;
        let mixer = graph.create_mixer(2)?;
        graph.set_output_source(mixer)?;
        let base = graph.create_base_layer(base_layer)?;
        graph.connect(mixer, BASE_INPUT, base)?;
        graph.set_input_weight(mixer, BASE_INPUT, 1.0)?;
        graph.set_input_weight(mixer, ONE_SHOT_INPUT, 0.0)?;
        graph.play()?;
        Ok((mixer, base))
    }

    /// Layer `clip` over the base layer.
    ///
    /// Requesting the clip that is already playing as the overlay does nothing.
    pub fn play_one_shot(&mut self, clip: &ClipRef) -> Result<(), MixerError> {
        self.ensure_alive()?;
        if let Some(active) = &self.one_shot {
            if active.clip.same_clip(clip) && self.graph.is_node_valid(active.node) {
                return Ok(());
            }
        }

        self.interrupt()?;

        let length = clip.effective_length();
        if length <= 0.0 {
            warn!(
                "one-shot '{}' has degenerate length {}; blending with the minimum duration",
                clip.name, clip.length
            );
        }
        let blend_duration = self.config.blend_duration(length);
        let blend_out_delay = (length - blend_duration).max(0.0);

        let node = self.graph.create_clip(clip)?;
        if let Err(e) = self.graph.connect(self.mixer, ONE_SHOT_INPUT, node) {
            self.graph.destroy_node(node)?;
            return Err(e.into());
        }

        self.blend_in = Some(
            self.tasks
                .run(Delayed::immediate(BlendTask::fade_in_overlay(blend_duration))),
        );
        self.blend_out = Some(self.tasks.run(Delayed::new(
            blend_out_delay,
            BlendTask::fade_out_overlay(blend_duration),
        )));
        self.one_shot = Some(ActiveOneShot {
            clip: clip.clone(),
            node,
            blend_duration,
        });
        debug!(
            "one-shot '{}' started (length {length}s, blend {blend_duration}s, blend-out after {blend_out_delay}s)",
            clip.name
        );
        Ok(())
    }

    /// Cut the current overlay immediately and return to the base layer.
    pub fn stop_one_shot(&mut self) -> Result<(), MixerError> {
        self.ensure_alive()?;
        self.interrupt()
    }

    /// Advance blend tasks by `dt` seconds, then evaluate the graph once.
    ///
    /// Negative or non-finite `dt` counts as 0.
    pub fn tick(&mut self, dt: f32) -> Result<FrameSample, MixerError> {
        self.ensure_alive()?;
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for handle in self.tasks.handles() {
            // None: cancelled earlier in this frame.
            let Some(poll) = self.tasks.step(handle, dt) else {
                continue;
            };
            match poll {
                TaskPoll::Pending => {}
                TaskPoll::Yield(base_weight) => self.apply_weights(base_weight)?,
                TaskPoll::Done(base_weight) => {
                    self.apply_weights(base_weight)?;
                    if self.blend_in == Some(handle) {
                        self.blend_in = None;
                    } else if self.blend_out == Some(handle) {
                        self.blend_out = None;
                        self.finish_overlay()?;
                    }
                }
            }
        }

        Ok(self.graph.evaluate(dt)?)
    }

    /// Switch the base layer to another declared state.
    pub fn set_base_state(&mut self, state: &str) -> Result<(), MixerError> {
        self.ensure_alive()?;
        self.graph.set_base_state(self.base, state)?;
        debug!("base layer switched to '{state}'");
        Ok(())
    }

    pub fn base_state(&self) -> Option<&str> {
        self.graph.base_state(self.base)
    }

    pub fn phase(&self) -> OverlayPhase {
        if self.one_shot.is_none() {
            return OverlayPhase::Idle;
        }
        if self.blend_in.is_some_and(|h| self.tasks.is_running(h)) {
            return OverlayPhase::BlendingIn;
        }
        // The blend-out counts as running only once it has moved the weights.
        match self.blend_out.and_then(|h| self.tasks.get(h)) {
            Some(task) if task.has_started() => OverlayPhase::BlendingOut,
            _ => OverlayPhase::Holding,
        }
    }

    /// `[base, overlay]` input weights; None once destroyed.
    pub fn weights(&self) -> Option<[f32; 2]> {
        let w0 = self.graph.input_weight(self.mixer, BASE_INPUT).ok()?;
        let w1 = self.graph.input_weight(self.mixer, ONE_SHOT_INPUT).ok()?;
        Some([w0, w1])
    }

    pub fn active_clip(&self) -> Option<&ClipRef> {
        self.one_shot.as_ref().map(|a| &a.clip)
    }

    /// Crossfade duration of the active overlay.
    pub fn active_blend_duration(&self) -> Option<f32> {
        self.one_shot.as_ref().map(|a| a.blend_duration)
    }

    pub fn one_shot_node(&self) -> Option<NodeHandle> {
        self.one_shot.as_ref().map(|a| a.node)
    }

    /// Number of live blend tasks (0, 1 or 2).
    pub fn active_blend_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn graph(&self) -> &PlayableGraph {
        &self.graph
    }

    pub fn mixer_node(&self) -> NodeHandle {
        self.mixer
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// Register a callback fired whenever an overlay ends, whether it played
    /// out fully or was interrupted.
    pub fn on_one_shot_finished<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        self.listeners.add(Box::new(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn is_destroyed(&self) -> bool {
        !self.graph.is_valid()
    }

    /// Release the graph and everything it owns, registered listeners
    /// included. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if !self.graph.is_valid() {
            return;
        }
        self.tasks.kill_all();
        self.blend_in = None;
        self.blend_out = None;
        self.one_shot = None;
        self.listeners.clear();
        self.graph.destroy();
        debug!("overlay mixer '{}' destroyed", self.config.graph_name);
    }

    fn ensure_alive(&self) -> Result<(), MixerError> {
        if self.graph.is_valid() {
            Ok(())
        } else {
            warn!("overlay mixer '{}' used after teardown", self.config.graph_name);
            Err(MixerError::Destroyed)
        }
    }

    fn apply_weights(&mut self, base_weight: f32) -> Result<(), MixerError> {
        self.graph
            .set_input_weight(self.mixer, BASE_INPUT, base_weight)?;
        self.graph
            .set_input_weight(self.mixer, ONE_SHOT_INPUT, 1.0 - base_weight)?;
        Ok(())
    }

    /// Cancel both blend tasks, snap to the base layer and drop any overlay.
    fn interrupt(&mut self) -> Result<(), MixerError> {
        if let Some(h) = self.blend_in.take() {
            self.tasks.kill(h);
        }
        if let Some(h) = self.blend_out.take() {
            self.tasks.kill(h);
        }
        self.apply_weights(1.0)?;
        if let Some(active) = &self.one_shot {
            debug!("one-shot '{}' interrupted", active.clip.name);
            self.finish_overlay()?;
        }
        Ok(())
    }

    /// Disconnect and destroy the overlay node, then notify listeners.
    fn finish_overlay(&mut self) -> Result<(), MixerError> {
        let Some(active) = self.one_shot.take() else {
            return Ok(());
        };
        // A blend-in still running here would write stale weights next frame.
        if let Some(h) = self.blend_in.take() {
            self.tasks.kill(h);
        }
        self.graph.disconnect(self.mixer, ONE_SHOT_INPUT)?;
        if self.graph.is_node_valid(active.node) {
            self.graph.destroy_node(active.node)?;
        }
        debug!("one-shot '{}' finished", active.clip.name);
        self.listeners.notify();
        Ok(())
    }
}

impl Drop for OverlayAnimationMixer {
    fn drop(&mut self) {
        self.destroy();
    }
}
