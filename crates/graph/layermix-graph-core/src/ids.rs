//! Identifiers for graph nodes and clips.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Stable identity of an animation clip. Two clip references are "the same
/// clip" iff their ids match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

new_key_type! {
    /// Handle into a graph's node arena. A handle kept after its node was
    /// destroyed never aliases a newer node.
    pub struct NodeHandle;
}
