//! Character profile types.
//!
//! A character is the persona an agent runtime embodies: how it looks, how
//! it behaves, how it sounds, and which emotes it can trigger. Profiles are
//! owned and persisted by the character service; these types are only the
//! wire representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a character's voice is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceType {
    /// Cloned from an uploaded sample.
    Cloned,
    /// One of the engine's preset voices.
    #[default]
    Preset,
}

impl VoiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cloned => "cloned",
            Self::Preset => "preset",
        }
    }

    /// Parses a stored voice type. Unknown values fall back to `Preset`.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "cloned" => Self::Cloned,
            _ => Self::Preset,
        }
    }
}

/// Visual appearance of a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Appearance {
    /// URL of the 3D model.
    pub model_url: String,
    /// URL of an optional texture override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_url: Option<String>,
}

/// Personality description fed to the agent runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Personality {
    pub traits: Vec<String>,
    pub backstory: String,
}

/// Voice configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceConfig {
    #[serde(rename = "type")]
    pub voice_type: VoiceType,
    /// Location of the uploaded sample, for cloned voices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_url: Option<String>,
    /// Engine preset identifier, for preset voices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<String>,
}

/// A persisted character profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub description: String,
    pub appearance: Appearance,
    pub personality: Personality,
    pub voice: VoiceConfig,
    /// Emote name to animation trigger.
    pub emotes: BTreeMap<String, String>,
}

/// Input for creating or replacing a character.
///
/// Every field may be omitted. Missing fields take the same defaults a
/// freshly created character gets: empty strings, no traits, a preset
/// voice, and no emotes. Empty optional URLs are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterDraft {
    pub name: String,
    pub description: String,
    pub appearance: Appearance,
    pub personality: Personality,
    pub voice: VoiceConfig,
    pub emotes: BTreeMap<String, String>,
}

impl CharacterDraft {
    /// Normalizes the draft and assigns it an identity.
    pub fn with_id(self, id: impl Into<String>) -> Character {
        Character {
            id: id.into(),
            name: self.name,
            description: self.description,
            appearance: Appearance {
                model_url: self.appearance.model_url,
                texture_url: non_empty(self.appearance.texture_url),
            },
            personality: self.personality,
            voice: VoiceConfig {
                voice_type: self.voice.voice_type,
                sample_url: non_empty(self.voice.sample_url),
                preset_id: non_empty(self.voice.preset_id),
            },
            emotes: self.emotes,
        }
    }
}

impl From<Character> for CharacterDraft {
    fn from(c: Character) -> Self {
        Self {
            name: c.name,
            description: c.description,
            appearance: c.appearance,
            personality: c.personality,
            voice: c.voice,
            emotes: c.emotes,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
