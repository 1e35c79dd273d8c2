//! SQLite persistence for character profiles.
//!
//! Traits and emotes are stored as JSON text. A row whose JSON columns
//! cannot be decoded still loads, with empty collections in their place.

use crate::error::CharacterError;
use companion_types::{
    Appearance, Character, CharacterDraft, Personality, VoiceConfig, VoiceType,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT
        id, name, description, model_url, texture_url,
        personality_traits, backstory, voice_type, voice_sample_url,
        voice_preset_id, emote_definitions
    FROM characters";

/// Inserts a new character with a freshly generated id.
pub fn create_character(
    conn: &Connection,
    draft: CharacterDraft,
) -> Result<Character, CharacterError> {
    let character = draft.with_id(Uuid::new_v4().to_string());
    let traits_json = serde_json::to_string(&character.personality.traits)?;
    let emotes_json = serde_json::to_string(&character.emotes)?;

    conn.execute(
        "INSERT INTO characters (
            id, name, description, model_url, texture_url,
            personality_traits, backstory, voice_type, voice_sample_url,
            voice_preset_id, emote_definitions
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            character.id,
            character.name,
            character.description,
            character.appearance.model_url,
            character.appearance.texture_url,
            traits_json,
            character.personality.backstory,
            character.voice.voice_type.as_str(),
            character.voice.sample_url,
            character.voice.preset_id,
            emotes_json,
        ],
    )?;

    tracing::debug!(character_id = %character.id, "character created");
    Ok(character)
}

/// Retrieves a character by id.
pub fn get_character(conn: &Connection, id: &str) -> Result<Character, CharacterError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SELECT_COLUMNS),
        [id],
        map_row_to_character,
    )
    .optional()?
    .ok_or_else(|| CharacterError::NotFound(id.to_string()))
}

/// Replaces every field of an existing character with the draft.
///
/// Fields absent from the draft are reset to their defaults, not kept.
pub fn update_character(
    conn: &Connection,
    id: &str,
    draft: CharacterDraft,
) -> Result<Character, CharacterError> {
    let character = draft.with_id(id);
    let traits_json = serde_json::to_string(&character.personality.traits)?;
    let emotes_json = serde_json::to_string(&character.emotes)?;

    let count = conn.execute(
        "UPDATE characters SET
            name = ?1, description = ?2, model_url = ?3, texture_url = ?4,
            personality_traits = ?5, backstory = ?6, voice_type = ?7,
            voice_sample_url = ?8, voice_preset_id = ?9, emote_definitions = ?10,
            updated_at = datetime('now')
        WHERE id = ?11",
        params![
            character.name,
            character.description,
            character.appearance.model_url,
            character.appearance.texture_url,
            traits_json,
            character.personality.backstory,
            character.voice.voice_type.as_str(),
            character.voice.sample_url,
            character.voice.preset_id,
            emotes_json,
            id,
        ],
    )?;
    if count == 0 {
        return Err(CharacterError::NotFound(id.to_string()));
    }
    Ok(character)
}

/// Deletes a character.
pub fn delete_character(conn: &Connection, id: &str) -> Result<(), CharacterError> {
    let count = conn.execute("DELETE FROM characters WHERE id = ?1", [id])?;
    if count == 0 {
        return Err(CharacterError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Switches a character to a preset voice.
pub fn set_voice_preset(
    conn: &Connection,
    id: &str,
    preset_id: &str,
) -> Result<Character, CharacterError> {
    let count = conn.execute(
        "UPDATE characters SET
            voice_type = ?1, voice_preset_id = ?2, updated_at = datetime('now')
        WHERE id = ?3",
        params![VoiceType::Preset.as_str(), preset_id, id],
    )?;
    if count == 0 {
        return Err(CharacterError::NotFound(id.to_string()));
    }
    get_character(conn, id)
}

/// Switches a character to a voice cloned from the sample at `sample_url`.
pub fn set_voice_sample(
    conn: &Connection,
    id: &str,
    sample_url: &str,
) -> Result<Character, CharacterError> {
    let count = conn.execute(
        "UPDATE characters SET
            voice_type = ?1, voice_sample_url = ?2, updated_at = datetime('now')
        WHERE id = ?3",
        params![VoiceType::Cloned.as_str(), sample_url, id],
    )?;
    if count == 0 {
        return Err(CharacterError::NotFound(id.to_string()));
    }
    get_character(conn, id)
}

fn map_row_to_character(row: &Row) -> rusqlite::Result<Character> {
    let traits_json: Option<String> = row.get(5)?;
    let traits: Vec<String> = decode_lossy(traits_json.as_deref());

    let emotes_json: Option<String> = row.get(10)?;
    let emotes: BTreeMap<String, String> = decode_lossy(emotes_json.as_deref());

    let voice_type: String = row.get(7)?;

    Ok(Character {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        appearance: Appearance {
            model_url: row.get(3)?,
            texture_url: row.get(4)?,
        },
        personality: Personality {
            traits,
            backstory: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        },
        voice: VoiceConfig {
            voice_type: VoiceType::parse_lossy(&voice_type),
            sample_url: row.get(8)?,
            preset_id: row.get(9)?,
        },
        emotes,
    })
}

fn decode_lossy<T: serde::de::DeserializeOwned + Default>(json: Option<&str>) -> T {
    match json {
        Some(s) => serde_json::from_str(s).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed stored JSON: {}", e);
            T::default()
        }),
        None => T::default(),
    }
}
