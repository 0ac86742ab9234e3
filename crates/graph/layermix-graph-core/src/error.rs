//! Error types for graph construction and topology edits.

use crate::ids::NodeHandle;
use crate::types::NodeKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("graph name must not be empty")]
    EmptyName,

    #[error("graph '{name}' has been destroyed")]
    Destroyed { name: String },

    #[error("output target must not be empty")]
    MissingTarget,

    #[error("graph already has an output bound ('{name}')")]
    OutputAlreadyBound { name: String },

    #[error("graph has no output binding")]
    NoOutput,

    #[error("node handle {node:?} is not valid in this graph")]
    InvalidHandle { node: NodeHandle },

    #[error("node {node:?} is a {actual:?} node, expected {expected:?}")]
    WrongNodeKind {
        node: NodeHandle,
        expected: NodeKind,
        actual: NodeKind,
    },

    #[error("mixer must have at least one input")]
    EmptyMixer,

    #[error("input {input} out of range for mixer with {count} inputs")]
    InputOutOfRange { input: usize, count: usize },

    #[error("mixer input {input} is already connected")]
    InputOccupied { input: usize },

    #[error("node {node:?} already feeds another mixer input")]
    SourceInUse { node: NodeHandle },

    #[error("connecting node {feeder:?} into mixer {mixer:?} would create a cycle")]
    Cycle { mixer: NodeHandle, feeder: NodeHandle },

    #[error("input weight must be finite, got {weight}")]
    InvalidWeight { weight: f32 },

    #[error("invalid base layer '{name}': {reason}")]
    InvalidBaseLayer { name: String, reason: String },

    #[error("base layer '{layer}' has no state named '{state}'")]
    UnknownState { layer: String, state: String },
}
