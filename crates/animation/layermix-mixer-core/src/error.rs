//! Error types for the overlay mixer.

use layermix_graph_core::GraphError;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum MixerError {
    /// Any call other than teardown after the mixer has been destroyed.
    #[error("overlay mixer has already been destroyed")]
    Destroyed,

    #[error("invalid mixer configuration: {reason}")]
    Config { reason: String },

    #[error("mixer config json parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
