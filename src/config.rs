//! Playback configuration.
//!
//! Read from YAML with kebab-case keys; every key is optional:
//!
//! ```yaml
//! reference-pitch: 60   # MIDI number of uppercase C
//! transpose: -2         # semitones added to every note
//! lyrics: true          # emit lyric events
//! ```

use crate::error::AbcError;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_REFERENCE_PITCH: u8 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PlaybackConfig {
    pub reference_pitch: u8,
    pub transpose: i8,
    pub lyrics: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            reference_pitch: DEFAULT_REFERENCE_PITCH,
            transpose: 0,
            lyrics: true,
        }
    }
}

impl PlaybackConfig {
    pub fn from_yaml(content: &str) -> Result<Self, AbcError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PlaybackConfig =
            serde_yaml::from_str(content).map_err(|e| AbcError::ConfigError(e.to_string()))?;
        if config.reference_pitch > 127 {
            return Err(AbcError::ConfigError(format!(
                "reference-pitch must be a MIDI note (0-127), got {}",
                config.reference_pitch
            )));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AbcError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
