//! Event envelopes exchanged with the character adapter.
//!
//! Every envelope is `{"type": "<name>", "data": {...}}`. Payload field
//! names are camelCase on the wire.

use companion_types::{Character, CharacterDraft};
use serde::{Deserialize, Serialize};

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum IncomingEvent {
    /// Accepted and ignored.
    #[serde(rename = "module:configure")]
    ModuleConfigure(Option<serde_json::Value>),
    #[serde(rename = "character:get")]
    CharacterGet { id: String },
    #[serde(rename = "character:create")]
    CharacterCreate {
        #[serde(default)]
        character: CharacterDraft,
    },
    #[serde(rename = "character:update")]
    CharacterUpdate {
        id: String,
        #[serde(default)]
        data: CharacterDraft,
    },
    #[serde(rename = "character:delete")]
    CharacterDelete { id: String },
    #[serde(rename = "voice:uploadSample")]
    VoiceUploadSample {
        #[serde(rename = "characterId")]
        character_id: String,
        format: String,
        /// Base64-encoded audio.
        audio: String,
    },
    #[serde(rename = "voice:selectPreset")]
    VoiceSelectPreset {
        #[serde(rename = "characterId")]
        character_id: String,
        #[serde(rename = "presetId")]
        preset_id: String,
    },
    #[serde(rename = "emote:trigger")]
    EmoteTrigger {
        #[serde(rename = "characterId")]
        character_id: String,
        #[serde(rename = "emoteName")]
        emote_name: String,
    },
    #[serde(rename = "input:text")]
    InputText { text: String },
}

/// Events the adapter sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OutgoingEvent {
    #[serde(rename = "character:data")]
    CharacterData { character: Character },
    #[serde(rename = "character:created")]
    CharacterCreated { character: Character },
    #[serde(rename = "character:updated")]
    CharacterUpdated { character: Character },
    #[serde(rename = "character:deleted")]
    CharacterDeleted { id: String },
    #[serde(rename = "voice:sampleUploaded")]
    VoiceSampleUploaded {
        #[serde(rename = "characterId")]
        character_id: String,
        #[serde(rename = "sampleUrl")]
        sample_url: String,
    },
    #[serde(rename = "emote:triggered")]
    EmoteTriggered {
        #[serde(rename = "characterId")]
        character_id: String,
        #[serde(rename = "emoteName")]
        emote_name: String,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

impl OutgoingEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
