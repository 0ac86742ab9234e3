use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::ids::ClipId;

/// Host-side object the graph output animates (a rig, a character root, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTarget {
    pub name: String,
}

impl AnimationTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to an animation clip: identity plus duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRef {
    pub id: ClipId,
    pub name: String,
    /// Duration in seconds.
    pub length: f32,
}

impl ClipRef {
    pub fn new(id: ClipId, name: impl Into<String>, length: f32) -> Self {
        Self {
            id,
            name: name.into(),
            length,
        }
    }

    /// Length usable for time math: negative and non-finite lengths collapse to 0.
    #[inline]
    pub fn effective_length(&self) -> f32 {
        if self.length.is_finite() {
            self.length.max(0.0)
        } else {
            0.0
        }
    }

    /// Same clip identity, regardless of name/length metadata.
    #[inline]
    pub fn same_clip(&self, other: &ClipRef) -> bool {
        self.id == other.id
    }
}

/// One state of a base layer state machine: a looping clip played at `speed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseState {
    pub name: String,
    pub clip: ClipRef,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 {
    1.0
}

/// Description of the continuous base layer (e.g. locomotion: idle/walk/run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayerSpec {
    pub name: String,
    pub states: Vec<BaseState>,
    /// Name of the state entered on creation. Falls back to the first state.
    #[serde(default)]
    pub default_state: Option<String>,
}

impl BaseLayerSpec {
    /// Parse a base layer description from JSON and validate it.
    pub fn from_json(s: &str) -> Result<Self, GraphError> {
        let spec: BaseLayerSpec =
            serde_json::from_str(s).map_err(|e| GraphError::InvalidBaseLayer {
                name: "<json>".to_string(),
                reason: format!("parse error: {e}"),
            })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Non-empty, unique state names, finite speeds, default state present.
    pub fn validate(&self) -> Result<(), GraphError> {
        let invalid = |reason: String| GraphError::InvalidBaseLayer {
            name: self.name.clone(),
            reason,
        };
        if self.states.is_empty() {
            return Err(invalid("no states".to_string()));
        }
        for (i, state) in self.states.iter().enumerate() {
            if state.name.is_empty() {
                return Err(invalid(format!("state #{i} has an empty name")));
            }
            if !state.speed.is_finite() {
                return Err(invalid(format!("state '{}' has a non-finite speed", state.name)));
            }
            if self.states[..i].iter().any(|s| s.name == state.name) {
                return Err(invalid(format!("duplicate state '{}'", state.name)));
            }
        }
        if let Some(default) = &self.default_state {
            if self.state_index(default).is_none() {
                return Err(invalid(format!("default state '{default}' is not declared")));
            }
        }
        Ok(())
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name == name)
    }

    pub fn default_state_index(&self) -> usize {
        self.default_state
            .as_deref()
            .and_then(|name| self.state_index(name))
            .unwrap_or(0)
    }

    /// Single-state layer looping one clip.
    pub fn single(name: impl Into<String>, clip: ClipRef) -> Self {
        let name = name.into();
        Self {
            states: vec![BaseState {
                name: name.clone(),
                clip,
                speed: 1.0,
            }],
            name,
            default_state: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Mixer,
    Clip,
    BaseLayer,
}
