//! layermix mixer core (engine-agnostic)
//!
//! [`OverlayAnimationMixer`] keeps a continuous base layer on mixer input 0
//! and layers transient one-shot clips on input 1 with proportional
//! crossfades in and out. Hosts call [`OverlayAnimationMixer::tick`] once per
//! frame; the returned [`FrameSample`] says which sources reach the output and
//! with what weight.

pub mod blend;
pub mod config;
pub mod error;
pub mod events;
pub mod mixer;

pub use blend::BlendTask;
pub use config::MixerConfig;
pub use error::MixerError;
pub use events::{FinishedListeners, ListenerId};
pub use mixer::{OverlayAnimationMixer, OverlayPhase, BASE_INPUT, ONE_SHOT_INPUT};

// Re-exports for hosts so they only need this crate.
pub use layermix_graph_core::{
    AnimationTarget, BaseLayerSpec, BaseState, ClipId, ClipRef, Contribution, FrameSample,
    GraphError, NodeHandle, SampleSource,
};
