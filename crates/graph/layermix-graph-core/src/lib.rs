//! layermix graph core (engine-agnostic)
//!
//! A minimal playable graph: weighted mixer nodes, clip-sampling nodes and
//! base-layer (state machine) nodes owned by an arena, plus a single output
//! binding. Hosts evaluate the graph once per frame after all weight edits.

pub mod error;
pub mod eval;
pub mod graph;
pub mod ids;
pub mod types;

pub use error::GraphError;
pub use eval::{Contribution, FrameSample, SampleSource};
pub use graph::{GraphOutput, PlayableGraph};
pub use ids::{ClipId, NodeHandle};
pub use types::{AnimationTarget, BaseLayerSpec, BaseState, ClipRef, NodeKind};
