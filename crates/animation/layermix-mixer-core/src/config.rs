//! Mixer configuration: crossfade sizing and graph naming.

use serde::{Deserialize, Serialize};

use crate::error::MixerError;

/// Configuration for an [`OverlayAnimationMixer`](crate::OverlayAnimationMixer).
///
/// The crossfade for a one-shot of length `L` lasts
/// `max(min_blend_seconds, min(L * blend_ratio, L * max_blend_fraction))`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Fraction of the clip length spent crossfading in (and out).
    pub blend_ratio: f32,
    /// Shortest crossfade, in seconds. Wins over the ceiling on very short clips.
    pub min_blend_seconds: f32,
    /// Longest crossfade as a fraction of the clip length.
    pub max_blend_fraction: f32,
    pub graph_name: String,
    pub output_name: String,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            blend_ratio: 0.1,
            min_blend_seconds: 0.1,
            max_blend_fraction: 0.5,
            graph_name: "AnimationSystem".to_string(),
            output_name: "Animation".to_string(),
        }
    }
}

impl MixerConfig {
    /// Parse a (possibly partial) config from JSON; missing fields take defaults.
    pub fn from_json(s: &str) -> Result<Self, MixerError> {
        let cfg: MixerConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), MixerError> {
        let fields = [
            ("blend_ratio", self.blend_ratio),
            ("min_blend_seconds", self.min_blend_seconds),
            ("max_blend_fraction", self.max_blend_fraction),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(MixerError::Config {
                    reason: format!("{name} must be a finite, non-negative number (got {value})"),
                });
            }
        }
        if self.min_blend_seconds <= 0.0 {
            return Err(MixerError::Config {
                reason: "min_blend_seconds must be greater than zero".to_string(),
            });
        }
        if self.graph_name.is_empty() || self.output_name.is_empty() {
            return Err(MixerError::Config {
                reason: "graph_name and output_name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Crossfade duration for a clip of `length` seconds. Always >= `min_blend_seconds`.
    pub fn blend_duration(&self, length: f32) -> f32 {
        let length = if length.is_finite() { length.max(0.0) } else { 0.0 };
        let proportional = length * self.blend_ratio;
        let ceiling = length * self.max_blend_fraction;
        self.min_blend_seconds.max(proportional.min(ceiling))
    }
}
