//! Per-frame evaluation: advance source times, then walk the output tree once.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{NodeData, PlayableGraph};
use crate::ids::{ClipId, NodeHandle};

/// What a contributing leaf node is playing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleSource {
    Clip {
        clip: ClipId,
        name: String,
    },
    BaseLayer {
        layer: String,
        state: String,
        clip: ClipId,
    },
}

/// One source reaching the output with a non-zero effective weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub node: NodeHandle,
    pub source: SampleSource,
    /// Product of mixer input weights along the path to the output.
    pub weight: f32,
    /// Local time of the source in seconds.
    pub time: f32,
}

/// Result of one graph evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl FrameSample {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    pub fn total_weight(&self) -> f32 {
        self.contributions.iter().map(|c| c.weight).sum()
    }

    /// Summed weight of every contribution playing `clip` (clip or base state).
    pub fn weight_of_clip(&self, clip: ClipId) -> f32 {
        self.contributions
            .iter()
            .filter(|c| match &c.source {
                SampleSource::Clip { clip: id, .. } => *id == clip,
                SampleSource::BaseLayer { clip: id, .. } => *id == clip,
            })
            .map(|c| c.weight)
            .sum()
    }

    /// Weight contributed by base-layer nodes.
    pub fn base_weight(&self) -> f32 {
        self.contributions
            .iter()
            .filter(|c| matches!(c.source, SampleSource::BaseLayer { .. }))
            .map(|c| c.weight)
            .sum()
    }
}

fn wrap_time(t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    t.rem_euclid(length)
}

impl PlayableGraph {
    /// Advance every source wired (directly or through mixers) to the output
    /// by `dt`, only while playing, then sample the output.
    ///
    /// Clip nodes clamp at their length; base-layer states loop. Nodes that
    /// are not connected to the output keep their time.
    pub fn evaluate(&mut self, dt: f32) -> Result<FrameSample, GraphError> {
        if !self.is_valid() {
            return Err(GraphError::Destroyed {
                name: self.name().to_string(),
            });
        }
        if self.output.is_none() {
            return Err(GraphError::NoOutput);
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if self.playing && dt > 0.0 {
            for handle in self.reachable()? {
                match &mut self.node_mut(handle)?.data {
                    NodeData::Clip { clip, time } => {
                        *time = (*time + dt).min(clip.effective_length());
                    }
                    NodeData::BaseLayer { spec, state, time } => {
                        let st = &spec.states[*state];
                        *time = wrap_time(*time + dt * st.speed, st.clip.effective_length());
                    }
                    NodeData::Mixer { .. } => {}
                }
            }
        }

        let mut sample = FrameSample::default();
        if let Some(root) = self.output_source() {
            self.collect(root, 1.0, &mut sample)?;
        }
        Ok(sample)
    }

    /// Every node reachable from the output, whatever its input weight.
    fn reachable(&self) -> Result<Vec<NodeHandle>, GraphError> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeHandle> = self.output_source().into_iter().collect();
        while let Some(handle) = stack.pop() {
            if let NodeData::Mixer { inputs } = &self.node(handle)?.data {
                stack.extend(inputs.iter().filter_map(|slot| slot.source));
            }
            found.push(handle);
        }
        Ok(found)
    }

    fn collect(
        &self,
        handle: NodeHandle,
        weight: f32,
        out: &mut FrameSample,
    ) -> Result<(), GraphError> {
        match &self.node(handle)?.data {
            NodeData::Mixer { inputs } => {
                for slot in inputs {
                    if let Some(src) = slot.source {
                        let w = weight * slot.weight;
                        if w > 0.0 {
                            self.collect(src, w, out)?;
                        }
                    }
                }
            }
            NodeData::Clip { clip, time } => out.contributions.push(Contribution {
                node: handle,
                source: SampleSource::Clip {
                    clip: clip.id,
                    name: clip.name.clone(),
                },
                weight,
                time: *time,
            }),
            NodeData::BaseLayer { spec, state, time } => {
                let st = &spec.states[*state];
                out.contributions.push(Contribution {
                    node: handle,
                    source: SampleSource::BaseLayer {
                        layer: spec.name.clone(),
                        state: st.name.clone(),
                        clip: st.clip.id,
                    },
                    weight,
                    time: *time,
                });
            }
        }
        Ok(())
    }
}
