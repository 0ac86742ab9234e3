//! PlayableGraph: owns every node in an arena and the single output binding.
//!
//! Nodes live in a [`SlotMap`] keyed by [`NodeHandle`]. Destroying a node
//! detaches it from whatever it was wired to; stale handles are rejected
//! afterwards instead of aliasing a recycled slot.

use log::{debug, trace};
use slotmap::SlotMap;

use crate::error::GraphError;
use crate::ids::NodeHandle;
use crate::types::{AnimationTarget, BaseLayerSpec, ClipRef, NodeKind};

/// One weighted input of a mixer node.
#[derive(Debug, Clone)]
pub(crate) struct InputSlot {
    pub(crate) source: Option<NodeHandle>,
    pub(crate) weight: f32,
}

#[derive(Debug)]
pub(crate) enum NodeData {
    Mixer {
        inputs: Vec<InputSlot>,
    },
    Clip {
        clip: ClipRef,
        time: f32,
    },
    BaseLayer {
        spec: BaseLayerSpec,
        state: usize,
        time: f32,
    },
}

impl NodeData {
    fn kind(&self) -> NodeKind {
        match self {
            NodeData::Mixer { .. } => NodeKind::Mixer,
            NodeData::Clip { .. } => NodeKind::Clip,
            NodeData::BaseLayer { .. } => NodeKind::BaseLayer,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) data: NodeData,
    /// Mixer input this node currently feeds, if any. A node feeds at most one input.
    pub(crate) consumer: Option<(NodeHandle, usize)>,
}

/// The graph's sole output: binds a source node to an animation target.
#[derive(Debug, Clone)]
pub struct GraphOutput {
    pub name: String,
    pub target: AnimationTarget,
    pub source: Option<NodeHandle>,
}

#[derive(Debug)]
pub struct PlayableGraph {
    name: String,
    nodes: SlotMap<NodeHandle, Node>,
    pub(crate) output: Option<GraphOutput>,
    pub(crate) playing: bool,
    destroyed: bool,
}

impl PlayableGraph {
    /// Create an empty, stopped graph.
    pub fn create(name: &str) -> Result<Self, GraphError> {
        if name.is_empty() {
            return Err(GraphError::EmptyName);
        }
        debug!("graph '{name}' created");
        Ok(Self {
            name: name.to_string(),
            nodes: SlotMap::with_key(),
            output: None,
            playing: false,
            destroyed: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// False once [`PlayableGraph::destroy`] has run.
    pub fn is_valid(&self) -> bool {
        !self.destroyed
    }

    /// Release every node and the output binding. Returns true if this call
    /// performed the release, false if the graph was already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let released = self.nodes.len();
        self.nodes.clear();
        self.output = None;
        self.playing = false;
        self.destroyed = true;
        debug!("graph '{}' destroyed ({released} nodes released)", self.name);
        true
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn play(&mut self) -> Result<(), GraphError> {
        self.ensure_alive()?;
        self.playing = true;
        Ok(())
    }

    /// Pause time advancement. Weights and wiring are untouched.
    pub fn stop(&mut self) -> Result<(), GraphError> {
        self.ensure_alive()?;
        self.playing = false;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Bind the graph output to `target`. A graph has exactly one output.
    pub fn create_output(&mut self, name: &str, target: &AnimationTarget) -> Result<(), GraphError> {
        self.ensure_alive()?;
        if target.name.is_empty() {
            return Err(GraphError::MissingTarget);
        }
        if let Some(existing) = &self.output {
            return Err(GraphError::OutputAlreadyBound {
                name: existing.name.clone(),
            });
        }
        self.output = Some(GraphOutput {
            name: name.to_string(),
            target: target.clone(),
            source: None,
        });
        Ok(())
    }

    pub fn output(&self) -> Option<&GraphOutput> {
        self.output.as_ref()
    }

    pub fn set_output_source(&mut self, node: NodeHandle) -> Result<(), GraphError> {
        self.ensure_alive()?;
        self.node(node)?;
        let output = self.output.as_mut().ok_or(GraphError::NoOutput)?;
        output.source = Some(node);
        Ok(())
    }

    pub fn output_source(&self) -> Option<NodeHandle> {
        self.output.as_ref().and_then(|o| o.source)
    }

    /// Create a mixer with `inputs` empty input slots, all at weight 0.
    pub fn create_mixer(&mut self, inputs: usize) -> Result<NodeHandle, GraphError> {
        self.ensure_alive()?;
        if inputs == 0 {
            return Err(GraphError::EmptyMixer);
        }
        let slots = vec![
            InputSlot {
                source: None,
                weight: 0.0,
            };
            inputs
        ];
        Ok(self.insert(NodeData::Mixer { inputs: slots }))
    }

    /// Create a clip-sampling node positioned at time 0.
    pub fn create_clip(&mut self, clip: &ClipRef) -> Result<NodeHandle, GraphError> {
        self.ensure_alive()?;
        Ok(self.insert(NodeData::Clip {
            clip: clip.clone(),
            time: 0.0,
        }))
    }

    /// Create a base-layer node in its default state.
    pub fn create_base_layer(&mut self, spec: &BaseLayerSpec) -> Result<NodeHandle, GraphError> {
        self.ensure_alive()?;
        spec.validate()?;
        let state = spec.default_state_index();
        Ok(self.insert(NodeData::BaseLayer {
            spec: spec.clone(),
            state,
            time: 0.0,
        }))
    }

    pub fn is_node_valid(&self, node: NodeHandle) -> bool {
        !self.destroyed && self.node(node).is_ok()
    }

    pub fn node_kind(&self, node: NodeHandle) -> Option<NodeKind> {
        self.node(node).ok().map(|n| n.data.kind())
    }

    /// Clip played by a clip node.
    pub fn clip_of(&self, node: NodeHandle) -> Option<&ClipRef> {
        match &self.node(node).ok()?.data {
            NodeData::Clip { clip, .. } => Some(clip),
            _ => None,
        }
    }

    /// Local playback time of a clip or base-layer node.
    pub fn local_time(&self, node: NodeHandle) -> Option<f32> {
        match &self.node(node).ok()?.data {
            NodeData::Clip { time, .. } | NodeData::BaseLayer { time, .. } => Some(*time),
            NodeData::Mixer { .. } => None,
        }
    }

    /// Wire `source` into `input` of `mixer`. The input keeps its current weight.
    pub fn connect(
        &mut self,
        mixer: NodeHandle,
        input: usize,
        source: NodeHandle,
    ) -> Result<(), GraphError> {
        self.ensure_alive()?;
        if mixer == source {
            return Err(GraphError::Cycle {
                mixer,
                feeder: source,
            });
        }
        if self.node(source)?.consumer.is_some() {
            return Err(GraphError::SourceInUse { node: source });
        }
        {
            let slot = self.input_slot(mixer, input)?;
            if slot.source.is_some() {
                return Err(GraphError::InputOccupied { input });
            }
        }
        // Walk downstream from the mixer; reaching `source` means a loop.
        let mut cursor = self.node(mixer)?.consumer.map(|(h, _)| h);
        while let Some(h) = cursor {
            if h == source {
                return Err(GraphError::Cycle {
                    mixer,
                    feeder: source,
                });
            }
            cursor = self.node(h)?.consumer.map(|(next, _)| next);
        }

        self.input_slot_mut(mixer, input)?.source = Some(source);
        self.node_mut(source)?.consumer = Some((mixer, input));
        trace!("connected node {source:?} -> mixer {mixer:?} input {input}");
        Ok(())
    }

    /// Detach whatever feeds `input` of `mixer`; returns the detached node.
    pub fn disconnect(
        &mut self,
        mixer: NodeHandle,
        input: usize,
    ) -> Result<Option<NodeHandle>, GraphError> {
        self.ensure_alive()?;
        let detached = self.input_slot_mut(mixer, input)?.source.take();
        if let Some(src) = detached {
            if let Ok(node) = self.node_mut(src) {
                node.consumer = None;
            }
            trace!("disconnected node {src:?} from mixer {mixer:?} input {input}");
        }
        Ok(detached)
    }

    pub fn set_input_weight(
        &mut self,
        mixer: NodeHandle,
        input: usize,
        weight: f32,
    ) -> Result<(), GraphError> {
        self.ensure_alive()?;
        if !weight.is_finite() {
            return Err(GraphError::InvalidWeight { weight });
        }
        self.input_slot_mut(mixer, input)?.weight = weight;
        Ok(())
    }

    pub fn input_weight(&self, mixer: NodeHandle, input: usize) -> Result<f32, GraphError> {
        self.ensure_alive()?;
        Ok(self.input_slot(mixer, input)?.weight)
    }

    pub fn input_source(
        &self,
        mixer: NodeHandle,
        input: usize,
    ) -> Result<Option<NodeHandle>, GraphError> {
        self.ensure_alive()?;
        Ok(self.input_slot(mixer, input)?.source)
    }

    pub fn input_count(&self, mixer: NodeHandle) -> Result<usize, GraphError> {
        match &self.node(mixer)?.data {
            NodeData::Mixer { inputs } => Ok(inputs.len()),
            other => Err(GraphError::WrongNodeKind {
                node: mixer,
                expected: NodeKind::Mixer,
                actual: other.kind(),
            }),
        }
    }

    /// Switch a base-layer node to `state`, restarting its local time.
    pub fn set_base_state(&mut self, node: NodeHandle, state: &str) -> Result<(), GraphError> {
        self.ensure_alive()?;
        match &mut self.node_mut(node)?.data {
            NodeData::BaseLayer {
                spec,
                state: current,
                time,
            } => {
                let next = spec
                    .state_index(state)
                    .ok_or_else(|| GraphError::UnknownState {
                        layer: spec.name.clone(),
                        state: state.to_string(),
                    })?;
                if next != *current {
                    *current = next;
                    *time = 0.0;
                }
                Ok(())
            }
            other => Err(GraphError::WrongNodeKind {
                node,
                expected: NodeKind::BaseLayer,
                actual: other.kind(),
            }),
        }
    }

    pub fn base_state(&self, node: NodeHandle) -> Option<&str> {
        match &self.node(node).ok()?.data {
            NodeData::BaseLayer { spec, state, .. } => Some(spec.states[*state].name.as_str()),
            _ => None,
        }
    }

    /// Destroy a node, detaching it from its consumer and from its own inputs.
    pub fn destroy_node(&mut self, node: NodeHandle) -> Result<(), GraphError> {
        self.ensure_alive()?;
        let removed = self
            .nodes
            .remove(node)
            .ok_or(GraphError::InvalidHandle { node })?;

        if let Some((mixer, input)) = removed.consumer {
            if let Ok(slot) = self.input_slot_mut(mixer, input) {
                slot.source = None;
            }
        }
        if let NodeData::Mixer { inputs } = removed.data {
            for src in inputs.into_iter().filter_map(|s| s.source) {
                if let Ok(n) = self.node_mut(src) {
                    n.consumer = None;
                }
            }
        }
        if let Some(output) = self.output.as_mut() {
            if output.source == Some(node) {
                output.source = None;
            }
        }
        trace!("destroyed node {node:?}");
        Ok(())
    }

    fn ensure_alive(&self) -> Result<(), GraphError> {
        if self.destroyed {
            Err(GraphError::Destroyed {
                name: self.name.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn insert(&mut self, data: NodeData) -> NodeHandle {
        self.nodes.insert(Node {
            data,
            consumer: None,
        })
    }

    pub(crate) fn node(&self, node: NodeHandle) -> Result<&Node, GraphError> {
        self.nodes.get(node).ok_or(GraphError::InvalidHandle { node })
    }

    pub(crate) fn node_mut(&mut self, node: NodeHandle) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(node)
            .ok_or(GraphError::InvalidHandle { node })
    }

    fn input_slot(&self, mixer: NodeHandle, input: usize) -> Result<&InputSlot, GraphError> {
        match &self.node(mixer)?.data {
            NodeData::Mixer { inputs } => {
                let count = inputs.len();
                inputs
                    .get(input)
                    .ok_or(GraphError::InputOutOfRange { input, count })
            }
            other => Err(GraphError::WrongNodeKind {
                node: mixer,
                expected: NodeKind::Mixer,
                actual: other.kind(),
            }),
        }
    }

    fn input_slot_mut(
        &mut self,
        mixer: NodeHandle,
        input: usize,
    ) -> Result<&mut InputSlot, GraphError> {
        match &mut self.node_mut(mixer)?.data {
            NodeData::Mixer { inputs } => {
                let count = inputs.len();
                inputs
                    .get_mut(input)
                    .ok_or(GraphError::InputOutOfRange { input, count })
            }
            other => Err(GraphError::WrongNodeKind {
                node: mixer,
                expected: NodeKind::Mixer,
                actual: other.kind(),
            }),
        }
    }
}
